use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    /// Templated upload URL, e.g. `.../assets{?name,label}`
    pub upload_url: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
}
