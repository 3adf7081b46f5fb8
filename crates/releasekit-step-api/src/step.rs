use std::collections::HashMap;

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};

use crate::context::BuildContext;
use crate::error::StepResult;
use crate::schema::ConfigSchema;

/// Step metadata - describes the step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepMetadata {
    /// Step name (e.g., "JIRA Ticket Editor")
    pub name: String,
    /// Step identifier (e.g., "jira")
    pub step_type: String,
    /// Step version
    pub version: String,
    /// Step description
    pub description: String,
    /// Step author
    pub author: Option<String>,
    /// Configuration keys the step understands
    pub config_schema: ConfigSchema,
}

/// Main step trait - all release automation steps implement this
#[async_trait]
pub trait ReleaseStep: Send + Sync {
    /// Get step metadata
    fn metadata(&self) -> &StepMetadata;

    /// Initialize the step with configuration
    fn initialize(&mut self, config: HashMap<String, String>) -> StepResult<()>;

    /// Validate credentials/configuration against the remote system
    async fn validate_credentials(&self) -> StepResult<bool>;

    /// Execute the step within the given build context
    async fn run(&self, ctx: &BuildContext) -> StepResult<()>;

    /// Get the step type string
    fn step_type(&self) -> &str {
        &self.metadata().step_type
    }
}
