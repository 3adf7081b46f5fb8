use releasekit_step_api::*;

pub fn create_metadata() -> StepMetadata {
    StepMetadata {
        name: "JIRA Ticket Updater".to_string(),
        step_type: "jira".to_string(),
        version: "0.1.0".to_string(),
        description: "Apply field updates and transitions to tickets matching a JQL query"
            .to_string(),
        author: Some("Releasekit Team".to_string()),
        config_schema: create_config_schema(),
    }
}

fn create_config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .add_field(ConfigField {
            key: "base_url".to_string(),
            label: "JIRA URL".to_string(),
            description: Some(
                "The JIRA server URL (e.g., https://jira.example.com)".to_string(),
            ),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "username".to_string(),
            label: "Username".to_string(),
            description: None,
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "token".to_string(),
            label: "API Token".to_string(),
            description: Some("API token or password used for basic auth".to_string()),
            required: true,
            secret: true,
        })
        .add_field(ConfigField {
            key: "project_key".to_string(),
            label: "Project Key".to_string(),
            description: Some("All queries and updates are scoped to this project".to_string()),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "tickets_jql".to_string(),
            label: "Tickets JQL".to_string(),
            description: Some(
                "JQL query selecting the tickets to update; ${var} references are expanded"
                    .to_string(),
            ),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "modifications".to_string(),
            label: "Modifications".to_string(),
            description: Some(
                "JSON list of modifications applied to each matching ticket".to_string(),
            ),
            required: true,
            secret: false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_declares_required_keys() {
        let metadata = create_metadata();
        assert_eq!(metadata.step_type, "jira");
        let keys: Vec<&str> = metadata
            .config_schema
            .fields
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert!(keys.contains(&"base_url"));
        assert!(keys.contains(&"tickets_jql"));
        assert!(keys.contains(&"modifications"));
    }
}
