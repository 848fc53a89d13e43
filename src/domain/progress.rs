// src/domain/progress.rs
use serde::{Deserialize, Serialize};

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
    pub is_complete: bool,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let current = current.min(total);
        // an empty run is complete by definition
        let percentage = if total == 0 {
            100
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            current,
            total,
            percentage,
            is_complete: current == total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedArticle {
    pub url: String,
    pub error: String,
}

/// Final outcome of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_articles: Option<Vec<FailedArticle>>,
    /// Set when the run was stopped by its cancellation token.
    #[serde(skip)]
    pub cancelled: bool,
}

impl ImportResult {
    /// Failure before any row was attempted; carries no counts.
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            message: message.into(),
            imported_count: None,
            failed_count: None,
            failed_articles: None,
            cancelled: false,
        }
    }

    pub fn authentication_failed() -> Self {
        Self::failure("Failed to authenticate")
    }

    pub fn nothing_to_import() -> Self {
        Self {
            success: false,
            message: "No articles to import".to_string(),
            imported_count: Some(0),
            failed_count: Some(0),
            failed_articles: None,
            cancelled: false,
        }
    }

    /// Result of a run that attempted rows, successful iff anything was imported.
    pub fn from_counts(total: usize, imported: usize, failed: Vec<FailedArticle>) -> Self {
        let failed_count = failed.len();
        let message = if failed_count == 0 {
            format!("Successfully imported {} articles", imported)
        } else if imported == 0 {
            format!("Failed to import any articles ({} failed)", failed_count)
        } else {
            format!(
                "Imported {} of {} articles ({} failed)",
                imported, total, failed_count
            )
        };
        Self::with_counts(message, imported, failed)
    }

    /// Result of a run stopped by its cancellation token.
    pub fn cancelled(total: usize, imported: usize, failed: Vec<FailedArticle>) -> Self {
        let attempted = imported + failed.len();
        let message = format!(
            "Import cancelled after {} of {} articles: {} imported, {} failed",
            attempted,
            total,
            imported,
            failed.len()
        );
        Self {
            cancelled: true,
            ..Self::with_counts(message, imported, failed)
        }
    }

    fn with_counts(message: String, imported: usize, failed: Vec<FailedArticle>) -> Self {
        let failed_count = failed.len();
        Self {
            success: imported > 0,
            message,
            imported_count: Some(imported),
            failed_count: Some(failed_count),
            failed_articles: if failed.is_empty() { None } else { Some(failed) },
            cancelled: false,
        }
    }

    pub fn imported(&self) -> usize {
        self.imported_count.unwrap_or(0)
    }

    pub fn failed(&self) -> usize {
        self.failed_count.unwrap_or(0)
    }
}
