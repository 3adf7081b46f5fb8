use std::collections::HashMap;

use releasekit_step_api::{
    StepError,
    StepResult,
};

pub(crate) fn get_required(config: &HashMap<String, String>, key: &str) -> StepResult<String> {
    config
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StepError::InvalidConfig(format!("Missing {key}")))
}

pub(crate) fn get_optional(config: &HashMap<String, String>, key: &str) -> Option<String> {
    config
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn get_base_url(config: &HashMap<String, String>) -> StepResult<String> {
    Ok(get_required(config, "base_url")?
        .trim_end_matches('/')
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = HashMap::from([(
            "base_url".to_string(),
            "https://wiki.example.com/".to_string(),
        )]);
        assert_eq!(get_base_url(&config).unwrap(), "https://wiki.example.com");
    }

    #[test]
    fn test_optional_blank_value_is_none() {
        let config = HashMap::from([("parent_page_title".to_string(), "  ".to_string())]);
        assert_eq!(get_optional(&config, "parent_page_title"), None);
    }
}
