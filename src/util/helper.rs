// src/util/helper.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::progress::FailedArticle;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// Read a CSV export as UTF-8, replacing invalid sequences.
#[instrument(level = "debug")]
pub fn read_csv_file(path: &Path) -> DomainResult<String> {
    let bytes = fs::read(path).map_err(|e| {
        DomainError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(text)
}

/// Write failed articles as a pretty JSON array.
#[instrument(level = "debug", skip(failed), fields(count = failed.len()))]
pub fn write_failed_report(path: &Path, failed: &[FailedArticle]) -> DomainResult<()> {
    let json = serde_json::to_string_pretty(failed).map_err(|e| {
        DomainError::Other(format!("Failed to serialize failed articles: {}", e))
    })?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn given_latin1_bytes_when_read_csv_then_lossy_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, b"Caf\xe9,https://example.com\n").unwrap();

        let text = read_csv_file(&path).unwrap();
        assert!(text.contains("https://example.com"));
    }

    #[test]
    fn given_missing_file_when_read_csv_then_invalid_input() {
        let err = read_csv_file(Path::new("/nonexistent/in.csv")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn given_failures_when_write_report_then_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("failed.json");
        let failed = vec![FailedArticle {
            url: "https://example.com".into(),
            error: "Rate limited by remote service (HTTP 429)".into(),
        }];

        write_failed_report(&path, &failed).unwrap();

        let written: Vec<FailedArticle> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, failed);
    }
}
