//! JIRA REST API client and methods

use releasekit_step_api::{
    StepError,
    StepResult,
};
use reqwest::Client;
use serde_json::json;

use crate::fields::FieldDescriptor;
use crate::types;
use crate::update::IssueUpdateBuilder;

/// JIRA API client scoped to one project.
pub struct JiraClient {
    pub(crate) client: Client,
    base_url: String,
    project_key: String,
}

impl JiraClient {
    pub fn new(client: Client, base_url: String, project_key: String) -> Self {
        Self {
            client,
            base_url,
            project_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Fetches the definitions of all fields visible to the user.
    pub async fn fetch_fields(&self) -> StepResult<Vec<FieldDescriptor>> {
        let url = format!("{}/rest/api/2/field", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to fetch fields: {e}")))?;

        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(StepError::AuthenticationFailed(
                    "JIRA rejected the credentials".to_string(),
                ));
            }
            status => {
                return Err(StepError::Api(format!(
                    "Failed to fetch fields: HTTP {status}"
                )));
            }
        }
        let remote: Vec<types::RemoteField> = response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse fields: {e}")))?;

        Ok(remote.into_iter().map(FieldDescriptor::from).collect())
    }

    /// Fetches all versions of the project.
    pub async fn fetch_versions(&self) -> StepResult<Vec<types::VersionInfo>> {
        let url = format!(
            "{}/rest/api/2/project/{}/versions",
            self.base_url, self.project_key
        );
        let versions: Vec<types::VersionInfo> = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to fetch versions: {e}")))?
            .error_for_status()
            .map_err(|e| StepError::Api(format!("Failed to fetch versions: {e}")))?
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse versions: {e}")))?;

        Ok(versions)
    }

    /// Finds a version by name, case-insensitively.
    pub async fn version_by_name(&self, name: &str) -> StepResult<Option<types::VersionInfo>> {
        let versions = self.fetch_versions().await?;
        Ok(versions
            .into_iter()
            .find(|v| v.name.eq_ignore_ascii_case(name)))
    }

    /// Creates a new, unreleased version in the project.
    pub async fn create_version(&self, name: &str) -> StepResult<types::VersionInfo> {
        let url = format!("{}/rest/api/2/version", self.base_url);
        let body = json!({ "name": name, "project": self.project_key });

        tracing::info!(version = name, "creating version");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to create version {name}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StepError::Api(format!(
                "Failed to create version {name}: HTTP {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse created version: {e}")))
    }

    /// Marks the named version as released, creating it first if absent.
    ///
    /// Released versions cannot be created directly, so this always goes
    /// through a create-then-update sequence.
    pub async fn release_version(&self, name: &str) -> StepResult<types::VersionInfo> {
        let existing = match self.version_by_name(name).await? {
            Some(version) => version,
            None => self.create_version(name).await?,
        };

        let id = existing.id.clone().ok_or_else(|| {
            StepError::Api(format!("Version {name} has no id in the server response"))
        })?;

        let url = format!("{}/rest/api/2/version/{id}", self.base_url);
        let body = json!({
            "name": existing.name,
            "archived": existing.archived,
            "released": true,
        });

        tracing::info!(version = name, "marking version as released");

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to update version {name}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StepError::Api(format!(
                "Failed to update version {name}: HTTP {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse updated version: {e}")))
    }

    /// Creates a ticket in the project and returns its key.
    pub async fn create_issue(
        &self, issue_type: &str, summary: &str, description: Option<&str>,
    ) -> StepResult<types::CreatedIssue> {
        let url = format!("{}/rest/api/2/issue", self.base_url);
        let mut fields = json!({
            "project": { "key": self.project_key },
            "issuetype": { "name": issue_type },
            "summary": summary,
        });
        if let Some(description) = description {
            fields["description"] = json!(description);
        }

        let response = self
            .client
            .post(&url)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to create issue: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StepError::Api(format!(
                "Failed to create issue: HTTP {status}: {error_text}"
            )));
        }
        let created: types::CreatedIssue = response
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse created issue: {e}")))?;

        tracing::info!(key = %created.key, "created issue");
        Ok(created)
    }

    /// Performs an update on the given ticket.
    ///
    /// The closure receives a fresh builder; the accumulated document is
    /// sent as one PUT request. An update with no operations is skipped.
    pub async fn update_issue<F>(&self, ticket_key: &str, build: F) -> StepResult<()>
    where
        F: FnOnce(&mut IssueUpdateBuilder) -> StepResult<()>,
    {
        let mut builder = IssueUpdateBuilder::new();
        build(&mut builder)?;
        if builder.is_empty() {
            tracing::debug!(key = ticket_key, "no field operations, skipping update");
            return Ok(());
        }

        let url = format!("{}/rest/api/2/issue/{ticket_key}", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(&builder.request_data())
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to update {ticket_key}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(key = ticket_key, "updated issue");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(StepError::Api(format!(
                "Failed to update {ticket_key}: HTTP {status}: {error_text}"
            )))
        }
    }

    /// Finds all tickets matching the given JQL query, scoped to the
    /// project this client was constructed with.
    pub async fn search_issues(&self, jql: &str) -> StepResult<Vec<types::IssueSummary>> {
        let scoped = format!("({jql}) AND project = \"{}\"", self.project_key);
        let url = format!(
            "{}/rest/api/2/search?jql={}&fields=summary,issuetype",
            self.base_url,
            urlencoding::encode(&scoped)
        );

        let response: types::SearchResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to search issues: {e}")))?
            .error_for_status()
            .map_err(|e| StepError::Api(format!("Failed to search issues: {e}")))?
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse search result: {e}")))?;

        Ok(response.issues)
    }

    /// Lists the workflow transitions available for the given ticket.
    pub async fn fetch_transitions(&self, ticket_key: &str) -> StepResult<Vec<types::Transition>> {
        let url = format!(
            "{}/rest/api/2/issue/{ticket_key}/transitions",
            self.base_url
        );
        let response: types::TransitionsResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to fetch transitions: {e}")))?
            .error_for_status()
            .map_err(|e| StepError::Api(format!("Failed to fetch transitions: {e}")))?
            .json()
            .await
            .map_err(|e| StepError::Api(format!("Failed to parse transitions: {e}")))?;

        Ok(response.transitions)
    }

    /// Performs the named workflow transition on the given ticket.
    ///
    /// The name is matched case-insensitively against the transitions
    /// currently available; an unavailable transition is a validation error
    /// naming the ticket and transition.
    pub async fn perform_transition(&self, ticket_key: &str, name: &str) -> StepResult<()> {
        let transitions = self.fetch_transitions(ticket_key).await?;
        let transition = transitions
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                StepError::Validation(format!(
                    "Transition \"{name}\" is not available for {ticket_key}"
                ))
            })?;

        let url = format!(
            "{}/rest/api/2/issue/{ticket_key}/transitions",
            self.base_url
        );
        let body = json!({ "transition": { "id": transition.id } });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StepError::Api(format!("Failed to transition {ticket_key}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(key = ticket_key, transition = name, "performed transition");
            Ok(())
        } else {
            Err(StepError::Api(format!(
                "Failed to transition {ticket_key}: HTTP {status}"
            )))
        }
    }
}
