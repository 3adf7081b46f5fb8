use releasekit_step_api::*;

pub fn create_metadata() -> StepMetadata {
    StepMetadata {
        name: "InfluxDB Publisher".to_string(),
        step_type: "influxdb".to_string(),
        version: "0.1.0".to_string(),
        description: "Publish build metrics in line-protocol format to InfluxDB".to_string(),
        author: Some("Releasekit Team".to_string()),
        config_schema: create_config_schema(),
    }
}

fn create_config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .add_field(ConfigField {
            key: "db_url".to_string(),
            label: "InfluxDB URL".to_string(),
            description: Some(
                "The InfluxDB server URL (e.g., http://influx.example.com:8086)".to_string(),
            ),
            required: true,
            secret: false,
        })
        .add_field(ConfigField {
            key: "database".to_string(),
            label: "Database".to_string(),
            description: Some("The database to write points into".to_string()),
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
            key: "password".to_string(),
            label: "Password".to_string(),
            description: None,
            required: true,
            secret: true,
        })
        .add_field(ConfigField {
            key: "content".to_string(),
            label: "Content".to_string(),
            description: Some(
                "Points in line-protocol format; ${var} references are expanded".to_string(),
            ),
            required: true,
            secret: false,
        })
}
