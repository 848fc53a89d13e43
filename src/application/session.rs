// src/application/session.rs
use crate::domain::credentials::{Credentials, TokenPair};
use crate::domain::error::RemoteError;
use crate::domain::row::Row;
use crate::domain::services::bookmark_api::BookmarkApi;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Token pair holder for exactly one import run.
///
/// Dropping the session discards the tokens; nothing is cached across runs.
#[derive(Debug)]
pub struct Session {
    api: Arc<dyn BookmarkApi>,
    tokens: Option<TokenPair>,
}

impl Session {
    pub fn new(api: Arc<dyn BookmarkApi>) -> Self {
        Self { api, tokens: None }
    }

    /// Stores the token pair on success. A failed attempt keeps whatever pair
    /// was stored before, so `false` means "no usable session from this call".
    #[instrument(skip(self, credentials), fields(user = %credentials.identifier))]
    pub async fn authenticate(&mut self, credentials: &Credentials) -> bool {
        match self.api.authenticate(credentials).await {
            Ok(tokens) => {
                debug!("Authentication succeeded");
                self.tokens = Some(tokens);
                true
            }
            Err(e) => {
                warn!("Authentication failed: {}", e);
                false
            }
        }
    }

    /// Fails locally, without a network call, when no token pair is stored.
    pub async fn add_article(&self, row: &Row) -> Result<(), RemoteError> {
        let tokens = self.tokens.as_ref().ok_or(RemoteError::NotAuthenticated)?;
        self.api.add_bookmark(tokens, row).await
    }
}
