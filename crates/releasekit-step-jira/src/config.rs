use std::collections::HashMap;

use releasekit_step_api::{
    StepError,
    StepResult,
};

use crate::modify::TicketModification;

pub(crate) fn get_required(config: &HashMap<String, String>, key: &str) -> StepResult<String> {
    config
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StepError::InvalidConfig(format!("Missing {key}")))
}

pub(crate) fn get_base_url(config: &HashMap<String, String>) -> StepResult<String> {
    Ok(get_required(config, "base_url")?
        .trim_end_matches('/')
        .to_string())
}

/// Parses the JSON list of ticket modifications from the config.
pub(crate) fn get_modifications(
    config: &HashMap<String, String>,
) -> StepResult<Vec<TicketModification>> {
    let raw = get_required(config, "modifications")?;
    serde_json::from_str(&raw)
        .map_err(|e| StepError::InvalidConfig(format!("Invalid modifications: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = HashMap::from([(
            "base_url".to_string(),
            "https://jira.example.com/".to_string(),
        )]);
        assert_eq!(get_base_url(&config).unwrap(), "https://jira.example.com");
    }

    #[test]
    fn test_modifications_parse_from_json() {
        let config = HashMap::from([(
            "modifications".to_string(),
            r#"[{"action": "add_comment", "body": "done"}]"#.to_string(),
        )]);
        let modifications = get_modifications(&config).unwrap();
        assert_eq!(modifications.len(), 1);
    }

    #[test]
    fn test_invalid_modifications_json_is_a_config_error() {
        let config = HashMap::from([("modifications".to_string(), "{broken".to_string())]);
        let err = get_modifications(&config).unwrap_err();
        assert!(matches!(err, StepError::InvalidConfig(_)));
    }
}
