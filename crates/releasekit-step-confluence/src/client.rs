//! Confluence REST API client

use releasekit_step_api::{
    StepError,
    StepResult,
};
use reqwest::Client;
use serde_json::json;

use crate::types;

/// Confluence API client scoped to one space.
pub(crate) struct ConfluenceClient {
    client: Client,
    base_url: String,
    space_key: String,
}

impl ConfluenceClient {
    pub fn new(client: Client, base_url: String, space_key: String) -> Self {
        Self {
            client,
            base_url,
            space_key,
        }
    }

    pub fn space_key(&self) -> &str {
        &self.space_key
    }

    /// Finds the ids of all pages in the space carrying the given title.
    /// Titles are unique per space, so this returns at most one id in
    /// practice; the API still models it as a list.
    pub async fn page_ids_by_title(&self, title: &str) -> StepResult<Vec<String>> {
        let url = format!(
            "{}/rest/api/content?spaceKey={}&title={}",
            self.base_url,
            urlencoding::encode(&self.space_key),
            urlencoding::encode(title)
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to search pages: {e}")))?;

        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(StepError::AuthenticationFailed(
                    "Confluence rejected the credentials".to_string(),
                ));
            }
            status => {
                return Err(StepError::Api(format!(
                    "Failed to search pages: HTTP {status}"
                )));
            }
        }
        let response: types::ContentSearchResponse = response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse page search: {e}")))?;

        Ok(response.results.into_iter().map(|page| page.id).collect())
    }

    /// Creates a page in the space with a storage-format body, optionally
    /// under a parent page.
    pub async fn create_page(
        &self, title: &str, body_html: &str, parent_id: Option<&str>,
    ) -> StepResult<types::CreatedPage> {
        let url = format!("{}/rest/api/content", self.base_url);
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": self.space_key },
            "body": {
                "storage": {
                    "value": body_html,
                    "representation": "storage",
                }
            },
        });
        if let Some(parent_id) = parent_id {
            payload["ancestors"] = json!([{ "type": "page", "id": parent_id }]);
        }

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to create page {title}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StepError::Api(format!(
                "Failed to create page {title}: HTTP {status}: {error_text}"
            )));
        }
        let created: types::CreatedPage = response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse created page: {e}")))?;

        tracing::info!(page = title, id = %created.id, "created page");
        Ok(created)
    }
}
