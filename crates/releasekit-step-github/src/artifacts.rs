//! Workspace artifact collection

use std::path::{
    Path,
    PathBuf,
};

use releasekit_step_api::{
    StepError,
    StepResult,
};

/// Collects the files matching the given glob patterns, relative to the
/// workspace root. Matches are deduplicated and sorted; directories are
/// skipped. A pattern matching nothing is not an error, the release is
/// simply published without that artifact.
pub(crate) fn collect_artifacts(workspace: &Path, patterns: &[String]) -> StepResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let absolute = workspace.join(pattern);
        let absolute = absolute.to_str().ok_or_else(|| {
            StepError::InvalidConfig(format!("Pattern {pattern} is not valid UTF-8"))
        })?;
        let paths = glob::glob(absolute)
            .map_err(|e| StepError::InvalidConfig(format!("Invalid pattern {pattern}: {e}")))?;
        for entry in paths {
            let path = entry
                .map_err(|e| StepError::Internal(format!("Failed to read {pattern} match: {e}")))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Guesses the content type used for the asset upload.
pub(crate) fn content_type_of(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "text/plain".to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_collects_matching_files_sorted_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/b.jar"), b"b").unwrap();
        fs::write(dir.path().join("target/a.jar"), b"a").unwrap();
        fs::write(dir.path().join("target/notes.txt"), b"n").unwrap();

        let patterns = vec![
            "target/*.jar".to_string(),
            "target/a.*".to_string(),
        ];
        let files = collect_artifacts(dir.path(), &patterns).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jar", "b.jar"]);
    }

    #[test]
    fn test_pattern_without_matches_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = collect_artifacts(dir.path(), &["dist/*.zip".to_string()]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_content_type_falls_back_to_text_plain() {
        assert_eq!(content_type_of(Path::new("report.pdf")), "application/pdf");
        assert_eq!(content_type_of(Path::new("artifact.withoutmime")), "text/plain");
    }
}
