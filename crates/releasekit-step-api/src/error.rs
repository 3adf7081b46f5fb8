use thiserror::Error;

/// Step error types
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StepResult<T> = Result<T, StepError>;

// Conversion from serde_json errors
impl From<serde_json::Error> for StepError {
    fn from(err: serde_json::Error) -> Self {
        StepError::Serialization(err.to_string())
    }
}

// Transport failures surface as network errors; HTTP status handling is done
// at the call sites where the status is known.
impl From<reqwest::Error> for StepError {
    fn from(err: reqwest::Error) -> Self {
        StepError::Network(err.to_string())
    }
}
