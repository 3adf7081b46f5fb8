//! GitHub release publishing step implementation

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
    ACCEPT,
    AUTHORIZATION,
    USER_AGENT,
};

use crate::{
    artifacts,
    client::GitHubClient,
    config,
};

/// Step creating a GitHub release for a tag and attaching build artifacts.
pub struct GithubReleaseStep {
    metadata: StepMetadata,
    http: Option<reqwest::Client>,
    config: HashMap<String, String>,
    retry_policy: RetryPolicy,
}

impl Default for GithubReleaseStep {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubReleaseStep {
    pub fn new() -> Self {
        Self {
            metadata: crate::metadata::create_metadata(),
            http: None,
            config: HashMap::new(),
            retry_policy: RetryPolicy::default(),
        }
    }

    fn http(&self) -> StepResult<&reqwest::Client> {
        self.http
            .as_ref()
            .ok_or_else(|| StepError::Internal("Step not initialized".to_string()))
    }

    fn client_for(&self, ctx: &BuildContext) -> StepResult<GitHubClient> {
        let base_url = ctx.expand(&config::get_base_url(&self.config));
        let repository = ctx.expand(&config::get_required(&self.config, "repository")?);
        let (owner, repo) = config::parse_repo(&repository)?;
        Ok(GitHubClient::new(
            self.http()?.clone(),
            config::build_api_url(&base_url),
            owner,
            repo,
        ))
    }

    /// Resolves the release body. When a notes query is configured the body
    /// is generated from the matching JIRA tickets, otherwise the static
    /// `body` value is used.
    async fn release_body(&self, ctx: &BuildContext) -> StepResult<String> {
        let jql = match config::get_optional(&self.config, "notes_jql") {
            Some(jql) => ctx.expand(&jql),
            None => {
                return Ok(config::get_optional(&self.config, "body")
                    .map(|body| ctx.expand(&body))
                    .unwrap_or_default());
            }
        };

        let jira = self.notes_client(ctx)?;
        let tickets = jira.search_issues(&jql).await?;
        tracing::info!(tickets = tickets.len(), "generating release notes");
        Ok(build_release_notes_html(jira.base_url(), &tickets))
    }

    /// Builds a JIRA client from the `jira_*` keys for note generation.
    /// This client carries its own basic-auth headers, separate from the
    /// token-authenticated GitHub client.
    fn notes_client(&self, ctx: &BuildContext) -> StepResult<JiraClient> {
        let base_url = ctx
            .expand(&config::get_required(&self.config, "jira_url")?)
            .trim_end_matches('/')
            .to_string();
        let project_key = ctx.expand(&config::get_required(&self.config, "jira_project_key")?);
        let username = config::get_required(&self.config, "jira_username")?;
        let token = config::get_required(&self.config, "jira_token")?;

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
            .build()
            .map_err(|e| StepError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(JiraClient::new(http, base_url, project_key))
    }

    /// Uploads one artifact, retrying on failure. A failed attempt can leave
    /// a half-uploaded asset behind, so any asset with the same name is
    /// deleted before the next attempt.
    async fn upload_with_retry(
        &self, client: &GitHubClient, release: &crate::types::Release, path: &std::path::Path,
    ) -> StepResult<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StepError::Internal(format!("Artifact path {} has no file name", path.display()))
            })?
            .to_string();
        let content_type = artifacts::content_type_of(path);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StepError::Internal(format!("Failed to read {}: {e}", path.display())))?;

        self.retry_policy
            .retry_with(
                || {
                    client.upload_asset(
                        &release.upload_url,
                        &file_name,
                        &content_type,
                        bytes.clone(),
                    )
                },
                || self.delete_stale_asset(client, release.id, &file_name),
            )
            .await?;
        tracing::info!(file = file_name, "uploaded asset");
        Ok(())
    }

    /// Removes a half-uploaded asset left by a failed attempt. Failures here
    /// are logged, not propagated; the retry itself will surface them.
    async fn delete_stale_asset(&self, client: &GitHubClient, release_id: u64, file_name: &str) {
        let assets = match client.list_assets(release_id).await {
            Ok(assets) => assets,
            Err(e) => {
                tracing::warn!(error = %e, "could not list assets for cleanup");
                return;
            }
        };
        for asset in assets.iter().filter(|a| a.name == file_name) {
            if let Err(e) = client.delete_asset(asset.id).await {
                tracing::warn!(file = file_name, error = %e, "could not delete stale asset");
            }
        }
    }
}

#[async_trait]
impl ReleaseStep for GithubReleaseStep {
    fn metadata(&self) -> &StepMetadata {
        &self.metadata
    }

    fn initialize(&mut self, config: HashMap<String, String>) -> StepResult<()> {
        self.metadata.config_schema.validate(&config)?;
        config::parse_repo(&config::get_required(&config, "repository")?)?;

        let token = config::get_required(&config, "token")?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StepError::InvalidConfig(format!("Invalid token format: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("releasekit"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StepError::Internal(format!("Failed to build HTTP client: {e}")))?;

        self.http = Some(http);
        self.config = config;
        Ok(())
    }

    async fn validate_credentials(&self) -> StepResult<bool> {
        let base_url = config::get_base_url(&self.config);
        let repository = config::get_required(&self.config, "repository")?;
        let (owner, repo) = config::parse_repo(&repository)?;
        GitHubClient::new(
            self.http()?.clone(),
            config::build_api_url(&base_url),
            owner,
            repo,
        )
        .check_repository()
        .await
    }

    async fn run(&self, ctx: &BuildContext) -> StepResult<()> {
        let client = self.client_for(ctx)?;
        let tag = ctx.expand(&config::get_required(&self.config, "tag")?);
        let name = config::get_optional(&self.config, "release_name")
            .map(|name| ctx.expand(&name))
            .unwrap_or_else(|| tag.clone());
        let body = self.release_body(ctx).await?;
        let prerelease = config::get_optional(&self.config, "prerelease")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        tracing::info!(repo = client.repo_slug(), tag, prerelease, "creating release");
        let release = client.create_release(&tag, &name, &body, prerelease).await?;

        let patterns = config::get_artifact_patterns(&self.config);
        if patterns.is_empty() {
            return Ok(());
        }
        let workspace = ctx.workspace().ok_or_else(|| {
            StepError::Validation("Artifact patterns configured but no workspace set".to_string())
        })?;
        let files = artifacts::collect_artifacts(workspace, &patterns)?;
        tracing::info!(artifacts = files.len(), "attaching artifacts");
        for file in &files {
            self.upload_with_retry(&client, &release, file).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> HashMap<String, String> {
        HashMap::from([
            ("token".to_string(), "ghp_secret".to_string()),
            ("repository".to_string(), "acme/widget".to_string()),
            ("tag".to_string(), "v${VERSION}".to_string()),
        ])
    }

    #[test]
    fn test_initialize_requires_config() {
        let mut step = GithubReleaseStep::new();
        assert!(step.initialize(HashMap::new()).is_err());
        assert!(step.initialize(valid_config()).is_ok());
    }

    #[test]
    fn test_initialize_rejects_malformed_repository() {
        let mut step = GithubReleaseStep::new();
        let mut config = valid_config();
        config.insert("repository".to_string(), "not-a-slug".to_string());
        let err = step.initialize(config).unwrap_err();
        assert!(matches!(err, StepError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_static_body_expands_variables() {
        let mut step = GithubReleaseStep::new();
        let mut config = valid_config();
        config.insert("body".to_string(), "Release ${VERSION}".to_string());
        step.initialize(config).unwrap();

        let ctx = BuildContext::from_env(HashMap::from([(
            "VERSION".to_string(),
            "1.2.0".to_string(),
        )]));
        assert_eq!(step.release_body(&ctx).await.unwrap(), "Release 1.2.0");
    }
}
