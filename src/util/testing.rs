// src/util/testing.rs

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::pacing::{Pacer, PauseKind};
use crate::config::{ENV_BATCH_SIZE, ENV_MAX_RETRIES, ENV_PROXY_URL};
use crate::domain::credentials::{Credentials, TokenPair};
use crate::domain::error::{DomainError, DomainResult, RemoteError};
use crate::domain::row::Row;
use crate::domain::services::bookmark_api::BookmarkApi;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// Global test configuration, initialized exactly once via OnceLock.
#[derive(Debug)]
pub struct TestEnv {
    pub resources: Vec<&'static str>,
}

static TEST_ENV: OnceLock<TestEnv> = OnceLock::new();

/// Initializes logging for tests exactly once.
pub fn init_test_env() -> &'static TestEnv {
    TEST_ENV.get_or_init(|| {
        setup_test_logging();
        info!("Test environment initialized");
        TestEnv {
            resources: vec!["tests/resources/articles.csv", "tests/resources/mixed_columns.csv"],
        }
    })
}

fn setup_test_logging() {
    debug!("Attempting logger init from testing.rs");
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let noisy_modules = ["reqwest", "hyper_util", "mio", "want", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Saves and clears the MARKPORT_* variables, restores them on drop.
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    const VARS: [&'static str; 3] = [ENV_PROXY_URL, ENV_BATCH_SIZE, ENV_MAX_RETRIES];

    pub fn new() -> Self {
        let saved = Self::VARS
            .iter()
            .map(|name| (*name, env::var(name).ok()))
            .collect();
        for name in Self::VARS {
            env::remove_var(name);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(val) => env::set_var(name, val),
                None => env::remove_var(name),
            }
        }
    }
}

/// In-memory [`BookmarkApi`] with scripted answers.
///
/// Authentication succeeds unless scripted otherwise. Each url answers from
/// its queue of outcomes and succeeds once the queue is drained, unless it was
/// registered with [`ScriptedBookmarkApi::always_failing`].
#[derive(Debug, Default)]
pub struct ScriptedBookmarkApi {
    auth_results: Mutex<VecDeque<bool>>,
    outcomes: Mutex<HashMap<String, VecDeque<Result<(), RemoteError>>>>,
    always_failing: Mutex<HashMap<String, RemoteError>>,
    cancel_on_call: Mutex<Option<(usize, CancellationToken)>>,
    delays: Mutex<HashMap<String, Duration>>,
    auth_calls: AtomicUsize,
    add_log: Mutex<Vec<String>>,
    seen_tokens: Mutex<Vec<TokenPair>>,
}

impl ScriptedBookmarkApi {
    pub const TOKEN: &'static str = "scripted-token";
    pub const TOKEN_SECRET: &'static str = "scripted-secret";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth_results<I: IntoIterator<Item = bool>>(self, results: I) -> Self {
        self.auth_results
            .lock()
            .expect("auth_results lock")
            .extend(results);
        self
    }

    pub fn rejecting_credentials(self) -> Self {
        self.with_auth_results([false])
    }

    pub fn with_outcomes<I>(self, url: &str, outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<(), RemoteError>>,
    {
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .entry(url.to_string())
            .or_default()
            .extend(outcomes);
        self
    }

    pub fn always_failing(self, url: &str, error: RemoteError) -> Self {
        self.always_failing
            .lock()
            .expect("always_failing lock")
            .insert(url.to_string(), error);
        self
    }

    /// Fire `token` while serving the n-th add call (1-based).
    pub fn cancelling_on_call(self, call: usize, token: CancellationToken) -> Self {
        *self.cancel_on_call.lock().expect("cancel lock") = Some((call, token));
        self
    }

    /// Hold every add call for `url` for `delay` before answering.
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .expect("delays lock")
            .insert(url.to_string(), delay);
        self
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.add_log.lock().expect("add_log lock").len()
    }

    pub fn add_calls_for(&self, url: &str) -> usize {
        self.add_log
            .lock()
            .expect("add_log lock")
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn added_urls(&self) -> Vec<String> {
        self.add_log.lock().expect("add_log lock").clone()
    }

    pub fn seen_tokens(&self) -> Vec<TokenPair> {
        self.seen_tokens.lock().expect("tokens lock").clone()
    }
}

#[async_trait]
impl BookmarkApi for ScriptedBookmarkApi {
    async fn authenticate(&self, _credentials: &Credentials) -> DomainResult<TokenPair> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let accepted = self
            .auth_results
            .lock()
            .expect("auth_results lock")
            .pop_front()
            .unwrap_or(true);
        if accepted {
            Ok(TokenPair::new(Self::TOKEN, Self::TOKEN_SECRET))
        } else {
            Err(DomainError::AuthenticationFailed("Invalid credentials".to_string()))
        }
    }

    async fn add_bookmark(&self, tokens: &TokenPair, row: &Row) -> Result<(), RemoteError> {
        let call = {
            let mut log = self.add_log.lock().expect("add_log lock");
            log.push(row.url.clone());
            log.len()
        };
        self.seen_tokens
            .lock()
            .expect("tokens lock")
            .push(tokens.clone());

        if let Some((at, token)) = self.cancel_on_call.lock().expect("cancel lock").as_ref() {
            if *at == call {
                token.cancel();
            }
        }

        let delay = self.delays.lock().expect("delays lock").get(&row.url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.always_failing.lock().expect("always_failing lock").get(&row.url) {
            return Err(error.clone());
        }
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .get_mut(&row.url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Ok(()))
    }
}

/// [`Pacer`] that records every pause instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<(PauseKind, Duration)>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<(PauseKind, Duration)> {
        self.pauses.lock().expect("pauses lock").clone()
    }

    pub fn count(&self, kind: PauseKind) -> usize {
        self.durations(kind).len()
    }

    pub fn durations(&self, kind: PauseKind) -> Vec<Duration> {
        self.pauses
            .lock()
            .expect("pauses lock")
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, d)| *d)
            .collect()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(
        &self,
        kind: PauseKind,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> ApplicationResult<()> {
        if cancel.is_cancelled() {
            return Err(ApplicationError::Cancelled);
        }
        self.pauses
            .lock()
            .expect("pauses lock")
            .push((kind, duration));
        Ok(())
    }
}

/// `n` distinct valid rows, `https://example.com/article/{i}`.
pub fn sample_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row {
            title: format!("Article {}", i),
            url: format!("https://example.com/article/{}", i),
            time_added: String::new(),
            tags: String::new(),
            status: String::new(),
        })
        .collect()
}
