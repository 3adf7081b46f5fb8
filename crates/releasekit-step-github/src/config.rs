//! Configuration parsing for the GitHub release step

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

/// Parses a repository string into owner and name
pub(crate) fn parse_repo(repo: &str) -> StepResult<(String, String)> {
    let parts: Vec<&str> = repo.split('/').collect();
    match parts.as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(StepError::InvalidConfig(format!(
            "Repository must be in owner/name form, got \"{repo}\""
        ))),
    }
}

/// Gets the base URL from configuration, defaulting to GitHub.com
pub(crate) fn get_base_url(config: &HashMap<String, String>) -> String {
    get_optional(config, "base_url")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| "https://github.com".to_string())
}

/// Builds the API URL from the base URL
///
/// GitHub.com has its API on a separate host, while GitHub Enterprise serves
/// it under `/api/v3`. The check compares the host exactly; an Enterprise
/// host like `github.company.com` must not be routed to api.github.com.
pub(crate) fn build_api_url(base_url: &str) -> String {
    let host = host_of(base_url);
    if host.eq_ignore_ascii_case("github.com") || host.eq_ignore_ascii_case("www.github.com") {
        "https://api.github.com".to_string()
    } else {
        format!("{}/api/v3", base_url.trim_end_matches('/'))
    }
}

fn host_of(url: &str) -> &str {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let authority = without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme);
    authority.split(':').next().unwrap_or(authority)
}

/// Splits the comma-separated artifact pattern list from the config.
pub(crate) fn get_artifact_patterns(config: &HashMap<String, String>) -> Vec<String> {
    config
        .get("artifact_patterns")
        .map(|patterns| {
            patterns
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo() {
        assert_eq!(
            parse_repo("owner/repo").unwrap(),
            ("owner".to_string(), "repo".to_string())
        );
        assert!(parse_repo("invalid").is_err());
        assert!(parse_repo("owner/repo/extra").is_err());
    }

    #[test]
    fn test_get_base_url_defaults_to_github_com() {
        let mut config = HashMap::new();
        assert_eq!(get_base_url(&config), "https://github.com");

        config.insert(
            "base_url".to_string(),
            "https://github.enterprise.com/".to_string(),
        );
        assert_eq!(get_base_url(&config), "https://github.enterprise.com");
    }

    #[test]
    fn test_build_api_url() {
        assert_eq!(build_api_url("https://github.com"), "https://api.github.com");
        assert_eq!(
            build_api_url("https://www.github.com"),
            "https://api.github.com"
        );
        assert_eq!(
            build_api_url("https://github.enterprise.com"),
            "https://github.enterprise.com/api/v3"
        );
    }

    #[test]
    fn test_enterprise_host_containing_github_com_stays_on_its_own_api() {
        // Substring matching would send the token for this host to
        // api.github.com.
        assert_eq!(
            build_api_url("https://github.company.com"),
            "https://github.company.com/api/v3"
        );
        assert_eq!(
            build_api_url("https://github.com.evil.example"),
            "https://github.com.evil.example/api/v3"
        );
    }

    #[test]
    fn test_artifact_patterns_split_and_trimmed() {
        let config = HashMap::from([(
            "artifact_patterns".to_string(),
            "target/*.jar, docs/*.pdf ,".to_string(),
        )]);
        assert_eq!(
            get_artifact_patterns(&config),
            vec!["target/*.jar".to_string(), "docs/*.pdf".to_string()]
        );
    }
}
