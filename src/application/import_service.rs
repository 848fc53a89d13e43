// src/application/import_service.rs
use crate::application::engine::ImportEngine;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::credentials::Credentials;
use crate::domain::parser::{parse_rows, ParseMode};
use crate::domain::progress::{ImportResult, Progress};
use crate::domain::row::Row;
use crate::domain::validation::{validate_rows, ValidationMode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Front-end entry point: CSV text in, [`ImportResult`] out.
#[derive(Debug, Clone)]
pub struct ImportService {
    engine: ImportEngine,
}

impl ImportService {
    pub fn new(engine: ImportEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ImportEngine {
        &self.engine
    }

    /// Parse and validate without touching the network.
    #[instrument(level = "debug", skip(text))]
    pub fn prepare(
        text: &str,
        mode: ParseMode,
        validation: ValidationMode,
    ) -> ApplicationResult<Vec<Row>> {
        if text.trim_start_matches('\u{feff}').trim().is_empty() {
            return Err(ApplicationError::Validation("CSV file is empty".to_string()));
        }

        let rows = parse_rows(text, mode);
        if rows.is_empty() {
            return Err(ApplicationError::Validation(
                "No valid URLs found in CSV".to_string(),
            ));
        }

        let outcome = validate_rows(&rows, validation);
        if !outcome.valid {
            return Err(ApplicationError::Validation(
                outcome
                    .message
                    .unwrap_or_else(|| "CSV validation failed".to_string()),
            ));
        }

        debug!("Prepared {} rows", rows.len());
        Ok(rows)
    }

    /// Input errors are returned before any remote call; everything after
    /// that is reported through the [`ImportResult`].
    #[instrument(skip(self, credentials, text, on_progress, cancel))]
    pub async fn import_text<F>(
        &self,
        credentials: &Credentials,
        text: &str,
        mode: ParseMode,
        validation: ValidationMode,
        on_progress: F,
        cancel: &CancellationToken,
    ) -> ApplicationResult<ImportResult>
    where
        F: FnMut(Progress),
    {
        let rows = Self::prepare(text, mode, validation)?;
        Ok(self
            .import_rows(credentials, &rows, on_progress, cancel)
            .await)
    }

    /// Import rows that already passed [`ImportService::prepare`].
    pub async fn import_rows<F>(
        &self,
        credentials: &Credentials,
        rows: &[Row],
        on_progress: F,
        cancel: &CancellationToken,
    ) -> ImportResult
    where
        F: FnMut(Progress),
    {
        self.engine
            .import_all(credentials, rows, on_progress, cancel)
            .await
    }
}
