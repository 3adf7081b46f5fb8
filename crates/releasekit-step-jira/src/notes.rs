//! Release notes rendering

use crate::types::IssueSummary;

/// Builds an HTML fragment listing the given tickets, grouped by issue type
/// with links back to the tracker.
pub fn build_release_notes_html(base_url: &str, issues: &[IssueSummary]) -> String {
    let mut issue_types: Vec<String> = issues.iter().map(issue_type_name).collect();
    issue_types.sort_by_key(|t| t.to_lowercase());
    issue_types.dedup();

    let mut html = String::new();
    for issue_type in &issue_types {
        html.push_str(&format!("<h2>{issue_type}</h2>"));
        html.push_str("<ul>");
        for issue in issues.iter().filter(|i| &issue_type_name(i) == issue_type) {
            let summary = issue.fields.summary.as_deref().unwrap_or("");
            html.push_str(&format!(
                "<li>[<a href='{base_url}/browse/{key}'>{key}</a>] - {summary}</li>",
                key = issue.key
            ));
        }
        html.push_str("</ul>");
    }
    html
}

fn issue_type_name(issue: &IssueSummary) -> String {
    issue
        .fields
        .issuetype
        .as_ref()
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "Other".to_string())
}
