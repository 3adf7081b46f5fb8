//! InfluxDB HTTP API client

use releasekit_step_api::{
    StepError,
    StepResult,
};
use reqwest::Client;

use crate::parser::ContentRecord;

/// Thin client for the InfluxDB `/write` and `/ping` endpoints.
pub(crate) struct InfluxClient {
    pub(crate) client: Client,
    base_url: String,
    database: String,
}

impl InfluxClient {
    pub fn new(client: Client, base_url: String, database: String) -> Self {
        Self {
            client,
            base_url,
            database,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks that the server answers and the credentials are accepted.
    pub async fn ping(&self) -> StepResult<bool> {
        let url = format!("{}/ping", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StepError::Network(format!("Failed to reach InfluxDB: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == 401 || status == 403 {
            Err(StepError::AuthenticationFailed(
                "Invalid InfluxDB credentials".to_string(),
            ))
        } else {
            Err(StepError::Api(format!("Ping failed: HTTP {status}")))
        }
    }

    /// Writes the given records as one batch with nanosecond precision.
    pub async fn write_records(&self, records: &[ContentRecord]) -> StepResult<()> {
        let url = format!(
            "{}/write?db={}&precision=ns",
            self.base_url,
            urlencoding::encode(&self.database)
        );

        let body = records
            .iter()
            .map(ContentRecord::to_line)
            .collect::<StepResult<Vec<_>>>()?
            .join("\n");

        tracing::debug!(records = records.len(), db = %self.database, "writing batch");

        let response = self
            .client
            .post(&url)
            .body(body)
            .send()
            .await
            .map_err(|e| StepError::Network(format!("Failed to write points: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(StepError::Api(format!(
                "Write failed: HTTP {status}: {error_text}"
            )))
        }
    }
}
