// src/application/pacing.rs
use crate::application::error::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Why the engine is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseKind {
    /// Adaptive delay between two rows of a batch.
    Row,
    /// Backoff before retrying a transient failure.
    Retry,
    /// Fixed pause between batches.
    Batch,
    /// Long pause between mega-batches.
    MegaBatch,
}

/// Every wait of an import run goes through here.
///
/// A pause ends early with [`ApplicationError::Cancelled`] once the token fires.
#[async_trait]
pub trait Pacer: Send + Sync + Debug {
    async fn pause(
        &self,
        kind: PauseKind,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> ApplicationResult<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(
        &self,
        kind: PauseKind,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> ApplicationResult<()> {
        trace!("{:?} pause for {:?}", kind, duration);
        if cancel.is_cancelled() {
            return Err(ApplicationError::Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApplicationError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

/// Scale `base` by `factor`, clamped to `[floor, ceiling]`.
fn scale(base: Duration, factor: f64, floor: Duration, ceiling: Duration) -> Duration {
    let raw = base.as_secs_f64() * factor;
    // 0 * inf
    if raw.is_nan() {
        return floor;
    }
    Duration::from_secs_f64(raw.clamp(floor.as_secs_f64(), ceiling.as_secs_f64()))
}

/// `initial * multiplier^attempt`, capped at `max`.
pub fn backoff_delay(initial: Duration, multiplier: f64, max: Duration, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    scale(initial, multiplier.powi(exponent), Duration::ZERO, max)
}

/// Per-run pacing value between rows.
///
/// Shrinks toward `floor` after each success and grows toward `ceiling`
/// after each failure.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveDelay {
    current: Duration,
    floor: Duration,
    ceiling: Duration,
    increase: f64,
    decrease: f64,
}

impl AdaptiveDelay {
    pub fn new(floor: Duration, ceiling: Duration, increase: f64, decrease: f64) -> Self {
        let ceiling = ceiling.max(floor);
        Self {
            current: floor,
            floor,
            ceiling,
            increase,
            decrease,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn on_success(&mut self) {
        self.current = scale(self.current, self.decrease, self.floor, self.ceiling);
    }

    pub fn on_failure(&mut self) {
        // a zero floor would never grow multiplicatively
        let base = if self.current.is_zero() {
            Duration::from_millis(1).min(self.ceiling)
        } else {
            self.current
        };
        self.current = scale(base, self.increase, self.floor, self.ceiling);
    }
}
