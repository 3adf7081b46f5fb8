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

pub(crate) fn get_base_url(config: &HashMap<String, String>) -> StepResult<String> {
    Ok(get_required(config, "db_url")?
        .trim_end_matches('/')
        .to_string())
}
