//! File checks.

use std::path::Path;

/// Returns true if `path` has the extension `ext` (given with or without the
/// leading dot).
#[must_use]
pub fn has_extension(path: impl AsRef<Path>, ext: &str) -> bool {
    let wanted = ext.trim_start_matches('.');
    path.as_ref()
        .extension()
        .is_some_and(|e| e.to_string_lossy() == wanted)
}

/// Returns true if the file exists and is not empty.
///
/// # Errors
///
/// Returns an error if the file cannot be inspected.
pub fn file_has_content(path: impl AsRef<Path>) -> std::io::Result<bool> {
    Ok(std::fs::metadata(path)?.len() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_has_extension() {
        assert!(has_extension("fixtures/a.tfvars", ".tfvars"));
        assert!(has_extension("main.tf", "tf"));
        assert!(!has_extension("main.tf.json", ".tf"));
        assert!(!has_extension("Makefile", ".tf"));
    }

    #[test]
    fn test_file_has_content() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let empty = temp.path().join("empty.tfvars");
        let full = temp.path().join("full.tfvars");
        std::fs::write(&empty, "").expect("Failed to write file");
        std::fs::write(&full, "a = 1\n").expect("Failed to write file");

        assert!(!file_has_content(&empty).expect("stat failed"));
        assert!(file_has_content(&full).expect("stat failed"));
        assert!(file_has_content(temp.path().join("missing")).is_err());
    }
}
