// src/application/engine.rs
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::pacing::{backoff_delay, AdaptiveDelay, Pacer, PauseKind, TokioPacer};
use crate::application::session::Session;
use crate::domain::credentials::Credentials;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::progress::{FailedArticle, ImportResult, Progress};
use crate::domain::row::Row;
use crate::domain::services::bookmark_api::BookmarkApi;
use derive_builder::Builder;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Batching, pacing and retry knobs of the import engine.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct ImportConfig {
    pub batch_size: usize,
    pub mega_batch_size: usize,
    pub batch_delay: Duration,
    pub mega_batch_delay: Duration,
    /// Retries after the first attempt, transient failures only.
    pub max_retries: u32,
    /// Base of the retry backoff and floor of the adaptive delay.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub adaptive_increase: f64,
    pub adaptive_decrease: f64,
    /// Progress is reported every n-th row and after the last one.
    pub progress_interval: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            mega_batch_size: 100,
            batch_delay: Duration::from_millis(2000),
            mega_batch_delay: Duration::from_millis(10_000),
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            backoff_multiplier: 2.0,
            adaptive_increase: 1.5,
            adaptive_decrease: 0.9,
            progress_interval: 5,
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> DomainResult<()> {
        let fail = |msg: &str| Err(DomainError::Configuration(msg.to_string()));
        if self.batch_size == 0 {
            return fail("batch_size must be greater than 0");
        }
        if self.mega_batch_size == 0 {
            return fail("mega_batch_size must be greater than 0");
        }
        if self.progress_interval == 0 {
            return fail("progress_interval must be greater than 0");
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return fail("backoff_multiplier must be a finite number >= 1");
        }
        if !self.adaptive_increase.is_finite() || self.adaptive_increase < 1.0 {
            return fail("adaptive_increase must be a finite number >= 1");
        }
        if !(self.adaptive_decrease > 0.0 && self.adaptive_decrease <= 1.0) {
            return fail("adaptive_decrease must be in (0, 1]");
        }
        if self.max_delay < self.initial_delay {
            return fail("max_delay must not be smaller than initial_delay");
        }
        Ok(())
    }

    /// Wait before retry number `attempt` (0-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        backoff_delay(
            self.initial_delay,
            self.backoff_multiplier,
            self.max_delay,
            attempt,
        )
    }

    fn adaptive_delay(&self) -> AdaptiveDelay {
        AdaptiveDelay::new(
            self.initial_delay,
            self.max_delay,
            self.adaptive_increase,
            self.adaptive_decrease,
        )
    }
}

/// Mutable bookkeeping of one run. Dropped with the run.
#[derive(Debug)]
struct RunState {
    total: usize,
    attempted: usize,
    imported: usize,
    failed: Vec<FailedArticle>,
    adaptive: AdaptiveDelay,
}

impl RunState {
    fn new(config: &ImportConfig, total: usize) -> Self {
        Self {
            total,
            attempted: 0,
            imported: 0,
            failed: Vec::new(),
            adaptive: config.adaptive_delay(),
        }
    }

    fn record_success(&mut self) {
        self.attempted += 1;
        self.imported += 1;
        self.adaptive.on_success();
    }

    fn record_failure(&mut self, url: &str, error: String) {
        self.attempted += 1;
        self.failed.push(FailedArticle {
            url: url.to_string(),
            error,
        });
        self.adaptive.on_failure();
    }

    fn progress_due(&self, interval: usize) -> bool {
        self.attempted % interval == 0 || self.attempted == self.total
    }

    fn finish(self) -> ImportResult {
        ImportResult::from_counts(self.total, self.imported, self.failed)
    }

    fn cancelled(self) -> ImportResult {
        ImportResult::cancelled(self.total, self.imported, self.failed)
    }
}

/// Delivers rows to a [`BookmarkApi`] one at a time with batching, pacing
/// and retries.
#[derive(Debug, Clone)]
pub struct ImportEngine {
    api: Arc<dyn BookmarkApi>,
    pacer: Arc<dyn Pacer>,
    config: ImportConfig,
}

impl ImportEngine {
    pub fn new(api: Arc<dyn BookmarkApi>, config: ImportConfig) -> Self {
        Self::with_pacer(api, Arc::new(TokioPacer), config)
    }

    pub fn with_pacer(api: Arc<dyn BookmarkApi>, pacer: Arc<dyn Pacer>, config: ImportConfig) -> Self {
        Self { api, pacer, config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import `rows` with a fresh session.
    ///
    /// Never fails: every outcome, including run-level errors, is reported
    /// through the returned [`ImportResult`].
    #[instrument(skip_all, fields(rows = rows.len(), user = %credentials.identifier))]
    pub async fn import_all<F>(
        &self,
        credentials: &Credentials,
        rows: &[Row],
        on_progress: F,
        cancel: &CancellationToken,
    ) -> ImportResult
    where
        F: FnMut(Progress),
    {
        match self.run(credentials, rows, on_progress, cancel).await {
            Ok(result) => {
                info!("{}", result.message);
                result
            }
            Err(e) => {
                error!("Import aborted: {}", e);
                ImportResult::failure(format!("Import failed: {}", e))
            }
        }
    }

    async fn run<F>(
        &self,
        credentials: &Credentials,
        rows: &[Row],
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> ApplicationResult<ImportResult>
    where
        F: FnMut(Progress),
    {
        self.config.validate()?;

        let total = rows.len();
        if total == 0 {
            debug!("Nothing to import");
            return Ok(ImportResult::nothing_to_import());
        }

        let mut session = Session::new(self.api.clone());
        let authenticated = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(ImportResult::cancelled(total, 0, Vec::new())),
            ok = session.authenticate(credentials) => ok,
        };
        if !authenticated {
            return Ok(ImportResult::authentication_failed());
        }

        let mut state = RunState::new(&self.config, total);
        match self
            .import_rows(&session, rows, &mut state, &mut on_progress, cancel)
            .await
        {
            Ok(()) => Ok(state.finish()),
            Err(ApplicationError::Cancelled) => {
                warn!("Import cancelled after {} of {} rows", state.attempted, total);
                Ok(state.cancelled())
            }
            Err(e) => Err(e),
        }
    }

    async fn import_rows<F>(
        &self,
        session: &Session,
        rows: &[Row],
        state: &mut RunState,
        on_progress: &mut F,
        cancel: &CancellationToken,
    ) -> ApplicationResult<()>
    where
        F: FnMut(Progress),
    {
        let total = rows.len();
        let mega_size = if total > self.config.mega_batch_size {
            self.config.mega_batch_size
        } else {
            total
        };
        let mega_batches: Vec<&[Row]> = rows.chunks(mega_size).collect();
        let mega_count = mega_batches.len();

        for (m, mega) in mega_batches.iter().enumerate() {
            let batches: Vec<&[Row]> = mega.chunks(self.config.batch_size).collect();
            info!(
                "Mega-batch {}/{}: {} rows in {} batches",
                m + 1,
                mega_count,
                mega.len(),
                batches.len()
            );

            for (b, batch) in batches.iter().enumerate() {
                debug!("Batch {}/{} of mega-batch {}", b + 1, batches.len(), m + 1);

                for (r, row) in batch.iter().enumerate() {
                    if cancel.is_cancelled() {
                        return Err(ApplicationError::Cancelled);
                    }
                    self.import_row(session, row, state, cancel).await?;

                    if state.progress_due(self.config.progress_interval) {
                        on_progress(Progress::new(state.attempted, total));
                    }
                    if r + 1 < batch.len() {
                        self.pacer
                            .pause(PauseKind::Row, state.adaptive.current(), cancel)
                            .await?;
                    }
                }

                let last_batch_of_run = m + 1 == mega_count && b + 1 == batches.len();
                if !last_batch_of_run {
                    self.pacer
                        .pause(PauseKind::Batch, self.config.batch_delay, cancel)
                        .await?;
                }
            }

            if m + 1 < mega_count {
                info!(
                    "Mega-batch {} done ({} imported, {} failed so far), pausing {:?}",
                    m + 1,
                    state.imported,
                    state.failed.len(),
                    self.config.mega_batch_delay
                );
                self.pacer
                    .pause(PauseKind::MegaBatch, self.config.mega_batch_delay, cancel)
                    .await?;
            }
        }
        Ok(())
    }

    /// One row with bounded retries. Only cancellation is returned as an
    /// error, remote failures are recorded in `state`.
    async fn import_row(
        &self,
        session: &Session,
        row: &Row,
        state: &mut RunState,
        cancel: &CancellationToken,
    ) -> ApplicationResult<()> {
        let mut attempt: u32 = 0;
        let outcome = loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ApplicationError::Cancelled),
                result = session.add_article(row) => result,
            };

            match result {
                Ok(()) => break Ok(()),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    state.adaptive.on_failure();
                    let wait = self.config.retry_delay(attempt);
                    warn!(
                        "Transient failure for {} (attempt {}): {}, retrying in {:?}",
                        row.url,
                        attempt + 1,
                        e,
                        wait
                    );
                    self.pacer.pause(PauseKind::Retry, wait, cancel).await?;
                    attempt += 1;
                }
                Err(e) if attempt > 0 => {
                    break Err(format!("{} (after {} attempts)", e, attempt + 1));
                }
                Err(e) => break Err(e.to_string()),
            }
        };

        match outcome {
            Ok(()) => {
                debug!("Imported {}", row);
                state.record_success();
            }
            Err(message) => {
                warn!("Failed to import {}: {}", row.url, message);
                state.record_failure(&row.url, message);
            }
        }
        Ok(())
    }
}
