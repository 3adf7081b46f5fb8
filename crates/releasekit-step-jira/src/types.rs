//! JIRA REST API response types

use serde::{
    Deserialize,
    Serialize,
};

/// One entry of the `/rest/api/2/field` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schema: Option<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: String,
    /// Element type when `field_type` is `"array"`
    #[serde(default)]
    pub items: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub released: bool,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TransitionsResponse {
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub issues: Vec<IssueSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueSummary {
    pub key: String,
    pub fields: IssueFieldValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFieldValues {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issuetype: Option<NamedEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntity {
    pub name: String,
}
