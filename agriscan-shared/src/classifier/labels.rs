//! Class label file parsing
//!
//! One label per line; line `i` names model output index `i`. Lines are
//! trimmed but never skipped, so a blank line still occupies its index.

use super::error::ClassifierError;
use std::path::Path;

/// Parses newline-delimited label text
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}

/// Reads and parses a label file
///
/// # Errors
///
/// `LabelLoad` if the file is missing, unreadable, or contains no labels.
pub fn load_labels(path: &Path) -> Result<Vec<String>, ClassifierError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ClassifierError::LabelLoad(format!("{}: {}", path.display(), e)))?;

    let labels = parse_labels(&text);
    if labels.is_empty() {
        return Err(ClassifierError::LabelLoad(format!(
            "{}: label file is empty",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), count = labels.len(), "Loaded class labels");
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_trims_each_line() {
        let labels = parse_labels("Tomato___healthy\r\n  Tomato___Late_blight \nCorn___rust\n");
        assert_eq!(
            labels,
            vec!["Tomato___healthy", "Tomato___Late_blight", "Corn___rust"]
        );
    }

    #[test]
    fn test_blank_lines_keep_their_index() {
        let labels = parse_labels("a\n\nc");
        assert_eq!(labels, vec!["a", "", "c"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "healthy").unwrap();
        writeln!(file, "blight").unwrap();

        let labels = load_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["healthy", "blight"]);
    }

    #[test]
    fn test_missing_file_is_label_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_labels(&dir.path().join("label_map.txt")).unwrap_err();
        assert!(matches!(err, ClassifierError::LabelLoad(_)));
    }

    #[test]
    fn test_empty_file_is_label_load_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            load_labels(file.path()),
            Err(ClassifierError::LabelLoad(_))
        ));
    }
}
