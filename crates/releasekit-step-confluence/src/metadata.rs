use releasekit_step_api::*;

pub fn create_metadata() -> StepMetadata {
    StepMetadata {
        name: "Confluence Page Publisher".to_string(),
        step_type: "confluence".to_string(),
        version: "0.1.0".to_string(),
        description: "Publish a release notes page to a Confluence space".to_string(),
        author: Some("Releasekit Team".to_string()),
        config_schema: create_config_schema(),
    }
}

fn create_config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .add_field(ConfigField {
            key: "base_url".to_string(),
            label: "Confluence URL".to_string(),
            description: Some(
                "The Confluence server URL (e.g., https://wiki.example.com)".to_string(),
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
            key: "space_key".to_string(),
            label: "Space Key".to_string(),
            description: Some("The space the page is created in".to_string()),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "page_title".to_string(),
            label: "Page Title".to_string(),
            description: Some("Title of the new page; ${var} references are expanded".to_string()),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "parent_page_title".to_string(),
            label: "Parent Page Title".to_string(),
            description: Some(
                "Title of an existing page the new page is nested under".to_string(),
            ),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "content".to_string(),
            label: "Page Content".to_string(),
            description: Some(
                "Static page body in storage format, used when no notes query is configured"
                    .to_string(),
            ),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "jira_url".to_string(),
            label: "JIRA URL".to_string(),
            description: Some(
                "JIRA server used to generate release notes for the page body".to_string(),
            ),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "jira_username".to_string(),
            label: "JIRA Username".to_string(),
            description: None,
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "jira_token".to_string(),
            label: "JIRA API Token".to_string(),
            description: None,
            required: false,
            secret: true,
        })
        .add_field(ConfigField {
            key: "jira_project_key".to_string(),
            label: "JIRA Project Key".to_string(),
            description: None,
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "notes_jql".to_string(),
            label: "Release Notes JQL".to_string(),
            description: Some(
                "JQL query selecting the tickets listed in the page body".to_string(),
            ),
            required: false,
            secret: false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_declares_required_keys() {
        let metadata = create_metadata();
        assert_eq!(metadata.step_type, "confluence");
        let required: Vec<&str> = metadata
            .config_schema
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["base_url", "username", "token", "space_key", "page_title"]
        );
    }
}
