use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    StepError,
    StepResult,
};

/// A single configuration key a step understands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigField {
    /// Field key (used in the config HashMap)
    pub key: String,
    /// Human-readable label
    pub label: String,
    /// Field description/help text
    pub description: Option<String>,
    /// Whether the field is required
    pub required: bool,
    /// Whether the value is a secret (token, password)
    pub secret: bool,
}

/// Complete configuration schema for a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub fields: Vec<ConfigField>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn add_field(mut self, field: ConfigField) -> Self {
        self.fields.push(field);
        self
    }

    /// Checks that every required key is present and non-blank.
    pub fn validate(&self, config: &HashMap<String, String>) -> StepResult<()> {
        for field in self.fields.iter().filter(|f| f.required) {
            match config.get(&field.key) {
                Some(value) if !value.trim().is_empty() => {}
                _ => {
                    return Err(StepError::InvalidConfig(format!(
                        "Missing required configuration value: {}",
                        field.label
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ConfigSchema {
        ConfigSchema::new()
            .add_field(ConfigField {
                key: "base_url".to_string(),
                label: "Server URL".to_string(),
                description: None,
                required: true,
                secret: false,
            })
            .add_field(ConfigField {
                key: "proxy".to_string(),
                label: "Proxy".to_string(),
                description: None,
                required: false,
                secret: false,
            })
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = HashMap::from([("base_url".to_string(), "https://x".to_string())]);
        assert!(schema().validate(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_required_key() {
        let config = HashMap::new();
        let err = schema().validate(&config).unwrap_err();
        assert!(err.to_string().contains("Server URL"));
    }

    #[test]
    fn test_validate_rejects_blank_required_value() {
        let config = HashMap::from([("base_url".to_string(), "   ".to_string())]);
        assert!(schema().validate(&config).is_err());
    }
}
