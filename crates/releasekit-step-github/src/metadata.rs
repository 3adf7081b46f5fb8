use releasekit_step_api::*;

pub fn create_metadata() -> StepMetadata {
    StepMetadata {
        name: "GitHub Release Publisher".to_string(),
        step_type: "github".to_string(),
        version: "0.1.0".to_string(),
        description: "Create a GitHub release and upload build artifacts to it".to_string(),
        author: Some("Releasekit Team".to_string()),
        config_schema: create_config_schema(),
    }
}

fn create_config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .add_field(ConfigField {
            key: "base_url".to_string(),
            label: "GitHub URL".to_string(),
            description: Some(
                "GitHub server URL; defaults to https://github.com".to_string(),
            ),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "token".to_string(),
            label: "Access Token".to_string(),
            description: None,
            required: true,
            secret: true,
        })
        .add_field(ConfigField {
            key: "repository".to_string(),
            label: "Repository".to_string(),
            description: Some("Target repository in owner/name form".to_string()),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "tag".to_string(),
            label: "Tag".to_string(),
            description: Some("Tag to release; ${var} references are expanded".to_string()),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "release_name".to_string(),
            label: "Release Name".to_string(),
            description: Some("Display name of the release; defaults to the tag".to_string()),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "body".to_string(),
            label: "Release Body".to_string(),
            description: Some(
                "Static release description, used when no notes query is configured".to_string(),
            ),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "prerelease".to_string(),
            label: "Prerelease".to_string(),
            description: Some("Mark the release as a prerelease (true/false)".to_string()),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "artifact_patterns".to_string(),
            label: "Artifact Patterns".to_string(),
            description: Some(
                "Comma-separated glob patterns, relative to the workspace, of files to attach"
                    .to_string(),
            ),
            required: false,
            secret: false,
        })
        .add_field(ConfigField {
            key: "jira_url".to_string(),
            label: "JIRA URL".to_string(),
            description: Some(
                "JIRA server used to generate release notes for the body".to_string(),
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
                "JQL query selecting the tickets listed in the release body".to_string(),
            ),
            required: false,
            secret: false,
        })
}
