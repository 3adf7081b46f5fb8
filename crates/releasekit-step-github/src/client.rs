//! GitHub REST API client for release publishing

use releasekit_step_api::{
    StepError,
    StepResult,
};
use reqwest::Client;
use serde_json::json;

use crate::types;

/// GitHub API client scoped to one repository.
pub(crate) struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(client: Client, api_url: String, owner: String, repo: String) -> Self {
        Self {
            client,
            api_url,
            owner,
            repo,
        }
    }

    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Checks that the token can see the repository.
    pub async fn check_repository(&self) -> StepResult<bool> {
        let url = format!("{}/repos/{}/{}", self.api_url, self.owner, self.repo);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to reach GitHub: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(StepError::Api(format!(
                "Unexpected response checking repository: HTTP {status}"
            ))),
        }
    }

    /// Creates a release for the given tag.
    pub async fn create_release(
        &self, tag: &str, name: &str, body: &str, prerelease: bool,
    ) -> StepResult<types::Release> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, self.owner, self.repo);
        let payload = json!({
            "tag_name": tag,
            "name": name,
            "body": body,
            "prerelease": prerelease,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to create release: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StepError::Api(format!(
                "Failed to create release for tag {tag}: HTTP {status}: {error_text}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse created release: {e}")))
    }

    /// Lists the assets attached to a release.
    pub async fn list_assets(&self, release_id: u64) -> StepResult<Vec<types::Asset>> {
        let url = format!(
            "{}/repos/{}/{}/releases/{release_id}/assets",
            self.api_url, self.owner, self.repo
        );
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to list assets: {e}")))?
            .error_for_status()
            .map_err(|e| StepError::Api(format!("Failed to list assets: {e}")))?
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse asset list: {e}")))
    }

    /// Deletes one release asset.
    pub async fn delete_asset(&self, asset_id: u64) -> StepResult<()> {
        let url = format!(
            "{}/repos/{}/{}/releases/assets/{asset_id}",
            self.api_url, self.owner, self.repo
        );
        self.client
            .delete(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to delete asset: {e}")))?
            .error_for_status()
            .map_err(|e| StepError::Api(format!("Failed to delete asset: {e}")))?;
        Ok(())
    }

    /// Uploads one asset to the release's upload endpoint.
    ///
    /// `upload_url` is the templated URL from the release payload; the
    /// `{?name,label}` suffix is stripped before use.
    pub async fn upload_asset(
        &self, upload_url: &str, file_name: &str, content_type: &str, bytes: Vec<u8>,
    ) -> StepResult<types::Asset> {
        let base = upload_url.split('{').next().unwrap_or(upload_url);
        let url = format!("{base}?name={}", urlencoding::encode(file_name));

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to upload {file_name}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StepError::Api(format!(
                "Failed to upload {file_name}: HTTP {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse uploaded asset: {e}")))
    }
}
