//! JIRA ticket update step implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use releasekit_step_api::*;
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
};

use crate::{
    client::JiraClient,
    config,
    fields::FieldDescriptor,
};

/// Step applying field updates and workflow transitions to tickets
/// matching a JQL query.
pub struct JiraUpdateStep {
    metadata: StepMetadata,
    http: Option<reqwest::Client>,
    config: HashMap<String, String>,
    field_cache: Arc<MetadataCache<Vec<FieldDescriptor>>>,
}

impl Default for JiraUpdateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl JiraUpdateStep {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(MetadataCache::new()))
    }

    /// Builds a step sharing a field cache with other steps of the same
    /// build, so field metadata is fetched once per connection.
    pub fn with_cache(field_cache: Arc<MetadataCache<Vec<FieldDescriptor>>>) -> Self {
        Self {
            metadata: crate::metadata::create_metadata(),
            http: None,
            config: HashMap::new(),
            field_cache,
        }
    }

    fn http(&self) -> StepResult<&reqwest::Client> {
        self.http
            .as_ref()
            .ok_or_else(|| StepError::Internal("Step not initialized".to_string()))
    }

    /// Builds a client for the resolved url and project key, which may both
    /// contain `${var}` references.
    fn client_for(&self, ctx: &BuildContext) -> StepResult<JiraClient> {
        let base_url = ctx.expand(&config::get_base_url(&self.config)?);
        let project_key = ctx.expand(&config::get_required(&self.config, "project_key")?);
        Ok(JiraClient::new(self.http()?.clone(), base_url, project_key))
    }

    async fn fields_for(&self, client: &JiraClient) -> StepResult<Vec<FieldDescriptor>> {
        let cache_key = format!("{}::{}", client.base_url(), client.project_key());
        self.field_cache
            .get_or_load(&cache_key, || client.fetch_fields())
            .await
    }
}

#[async_trait]
impl ReleaseStep for JiraUpdateStep {
    fn metadata(&self) -> &StepMetadata {
        &self.metadata
    }

    fn initialize(&mut self, config: HashMap<String, String>) -> StepResult<()> {
        self.metadata.config_schema.validate(&config)?;
        // Parse errors in the modification list should surface at
        // configuration time, not on the first matching ticket.
        config::get_modifications(&config)?;

        let username = config::get_required(&config, "username")?;
        let token = config::get_required(&config, "token")?;

        let auth_value = format!("{username}:{token}");
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
        let project_key = config::get_required(&self.config, "project_key")?;
        let client = JiraClient::new(self.http()?.clone(), base_url, project_key);
        match client.fetch_fields().await {
            Ok(_) => Ok(true),
            Err(StepError::AuthenticationFailed(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn run(&self, ctx: &BuildContext) -> StepResult<()> {
        let modifications = config::get_modifications(&self.config)?;
        if modifications.is_empty() {
            tracing::info!("no modifications configured, skipping update");
            return Ok(());
        }

        let client = self.client_for(ctx)?;
        let jql = ctx.expand(&config::get_required(&self.config, "tickets_jql")?);

        let fields = self.fields_for(&client).await?;
        let tickets = client.search_issues(&jql).await?;
        tracing::info!(
            tickets = tickets.len(),
            project = client.project_key(),
            "updating matching tickets"
        );

        for ticket in &tickets {
            let mut transitions = Vec::new();
            client
                .update_issue(&ticket.key, |builder| {
                    for modification in &modifications {
                        modification.apply(&fields, ctx.variables(), builder, &mut transitions)?;
                    }
                    Ok(())
                })
                .await?;
            for transition in &transitions {
                client.perform_transition(&ticket.key, transition).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> HashMap<String, String> {
        HashMap::from([
            (
                "base_url".to_string(),
                "https://jira.example.com".to_string(),
            ),
            ("username".to_string(), "ci".to_string()),
            ("token".to_string(), "secret".to_string()),
            ("project_key".to_string(), "REL".to_string()),
            (
                "tickets_jql".to_string(),
                "fixVersion = ${VERSION}".to_string(),
            ),
            (
                "modifications".to_string(),
                r#"[{"action": "add_comment", "body": "released"}]"#.to_string(),
            ),
        ])
    }

    #[test]
    fn test_initialize_requires_config() {
        let mut step = JiraUpdateStep::new();
        assert!(step.initialize(HashMap::new()).is_err());
        assert!(step.initialize(valid_config()).is_ok());
    }

    #[test]
    fn test_initialize_rejects_malformed_modifications() {
        let mut step = JiraUpdateStep::new();
        let mut config = valid_config();
        config.insert("modifications".to_string(), "[{".to_string());
        let err = step.initialize(config).unwrap_err();
        assert!(matches!(err, StepError::InvalidConfig(_)));
    }
}
