use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ContentSearchResponse {
    pub results: Vec<ContentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPage {
    pub id: String,
}
