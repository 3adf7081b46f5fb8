//! Confluence page publishing step implementation

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use releasekit_step_api::*;
use releasekit_step_jira::{
    build_release_notes_html,
    JiraClient,
};
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
};

use crate::{
    client::ConfluenceClient,
    config,
};

/// Step publishing a page, typically release notes, to a Confluence space.
pub struct ConfluencePublishStep {
    metadata: StepMetadata,
    http: Option<reqwest::Client>,
    config: HashMap<String, String>,
}

impl Default for ConfluencePublishStep {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfluencePublishStep {
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

    fn client_for(&self, ctx: &BuildContext) -> StepResult<ConfluenceClient> {
        let base_url = ctx.expand(&config::get_base_url(&self.config)?);
        let space_key = ctx.expand(&config::get_required(&self.config, "space_key")?);
        Ok(ConfluenceClient::new(
            self.http()?.clone(),
            base_url,
            space_key,
        ))
    }

    /// Resolves the page body. When a notes query is configured the body is
    /// generated from the matching JIRA tickets, otherwise the static
    /// `content` value is used.
    async fn page_body(&self, ctx: &BuildContext) -> StepResult<String> {
        let jql = match config::get_optional(&self.config, "notes_jql") {
            Some(jql) => ctx.expand(&jql),
            None => {
                return Ok(config::get_optional(&self.config, "content")
                    .map(|content| ctx.expand(&content))
                    .unwrap_or_default());
            }
        };

        let jira = self.notes_client(ctx)?;
        let tickets = jira.search_issues(&jql).await?;
        tracing::info!(tickets = tickets.len(), "generating release notes");
        Ok(build_release_notes_html(jira.base_url(), &tickets))
    }

    fn notes_client(&self, ctx: &BuildContext) -> StepResult<JiraClient> {
        let base_url = ctx
            .expand(&config::get_required(&self.config, "jira_url")?)
            .trim_end_matches('/')
            .to_string();
        let project_key = ctx.expand(&config::get_required(&self.config, "jira_project_key")?);
        let username = config::get_required(&self.config, "jira_username")?;
        let token = config::get_required(&self.config, "jira_token")?;

        let http = basic_auth_client(&username, &token)?;
        Ok(JiraClient::new(http, base_url, project_key))
    }

    /// Resolves the configured parent page title to its id, if any. A
    /// configured parent that does not exist is a validation error rather
    /// than a silently top-level page.
    async fn parent_id_for(
        &self, client: &ConfluenceClient, ctx: &BuildContext,
    ) -> StepResult<Option<String>> {
        let title = match config::get_optional(&self.config, "parent_page_title") {
            Some(title) => ctx.expand(&title),
            None => return Ok(None),
        };
        let mut ids = client.page_ids_by_title(&title).await?;
        match ids.pop() {
            Some(id) => Ok(Some(id)),
            None => Err(StepError::Validation(format!(
                "Parent page \"{title}\" does not exist in space {}",
                client.space_key()
            ))),
        }
    }
}

fn basic_auth_client(username: &str, token: &str) -> StepResult<reqwest::Client> {
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

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| StepError::Internal(format!("Failed to build HTTP client: {e}")))
}

#[async_trait]
impl ReleaseStep for ConfluencePublishStep {
    fn metadata(&self) -> &StepMetadata {
        &self.metadata
    }

    fn initialize(&mut self, config: HashMap<String, String>) -> StepResult<()> {
        self.metadata.config_schema.validate(&config)?;

        let username = config::get_required(&config, "username")?;
        let token = config::get_required(&config, "token")?;
        self.http = Some(basic_auth_client(&username, &token)?);
        self.config = config;
        Ok(())
    }

    async fn validate_credentials(&self) -> StepResult<bool> {
        let base_url = config::get_base_url(&self.config)?;
        let space_key = config::get_required(&self.config, "space_key")?;
        let client = ConfluenceClient::new(self.http()?.clone(), base_url, space_key);
        // Any authenticated request will do; an empty title list is fine.
        match client.page_ids_by_title("").await {
            Ok(_) => Ok(true),
            Err(StepError::AuthenticationFailed(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn run(&self, ctx: &BuildContext) -> StepResult<()> {
        let client = self.client_for(ctx)?;
        let title = ctx.expand(&config::get_required(&self.config, "page_title")?);
        let body = self.page_body(ctx).await?;
        let parent_id = self.parent_id_for(&client, ctx).await?;

        tracing::info!(
            space = client.space_key(),
            page = title,
            "publishing page"
        );
        client
            .create_page(&title, &body, parent_id.as_deref())
            .await?;
        Ok(())
    }
}
