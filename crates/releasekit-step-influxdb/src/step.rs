//! InfluxDB publish step implementation

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use releasekit_step_api::*;
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
};

use crate::{
    client,
    config,
    parser,
};

/// Step publishing line-protocol content to InfluxDB
pub struct InfluxPublishStep {
    metadata: StepMetadata,
    http: Option<reqwest::Client>,
    config: HashMap<String, String>,
}

impl Default for InfluxPublishStep {
    fn default() -> Self {
        Self::new()
    }
}

impl InfluxPublishStep {
    pub fn new() -> Self {
        Self {
            metadata: crate::metadata::create_metadata(),
            http: None,
            config: HashMap::new(),
        }
    }

    fn http(&self) -> StepResult<&reqwest::Client> {
        self.http
            .as_ref()
            .ok_or_else(|| StepError::Internal("Step not initialized".to_string()))
    }

    /// Builds a client for the resolved url and database. The url and
    /// database may contain `${var}` references, so the client is assembled
    /// per run rather than at initialization.
    fn client_for(&self, ctx: &BuildContext) -> StepResult<client::InfluxClient> {
        let base_url = ctx.expand(&config::get_base_url(&self.config)?);
        let database = ctx.expand(&config::get_required(&self.config, "database")?);
        Ok(client::InfluxClient::new(
            self.http()?.clone(),
            base_url,
            database,
        ))
    }
}

#[async_trait]
impl ReleaseStep for InfluxPublishStep {
    fn metadata(&self) -> &StepMetadata {
        &self.metadata
    }

    fn initialize(&mut self, config: HashMap<String, String>) -> StepResult<()> {
        self.metadata.config_schema.validate(&config)?;

        let username = config::get_required(&config, "username")?;
        let password = config::get_required(&config, "password")?;

        let auth_value = format!("{username}:{password}");
        let auth_header = format!(
            "Basic {}",
            base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                auth_value.as_bytes()
            )
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_header)
                .map_err(|e| StepError::InvalidConfig(format!("Invalid auth format: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StepError::Internal(format!("Failed to build HTTP client: {e}")))?;

        self.http = Some(http);
        self.config = config;
        Ok(())
    }

    async fn validate_credentials(&self) -> StepResult<bool> {
        let base_url = config::get_base_url(&self.config)?;
        let database = config::get_required(&self.config, "database")?;
        client::InfluxClient::new(self.http()?.clone(), base_url, database)
            .ping()
            .await
    }

    async fn run(&self, ctx: &BuildContext) -> StepResult<()> {
        let content = ctx.expand(&config::get_required(&self.config, "content")?);
        let records = parser::parse(&content)?;
        if records.is_empty() {
            tracing::info!("no points to publish, skipping write");
            return Ok(());
        }

        let client = self.client_for(ctx)?;
        tracing::info!(
            points = records.len(),
            url = client.base_url(),
            "publishing points to InfluxDB"
        );
        client.write_records(&records).await
    }
}
