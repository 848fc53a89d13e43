// src/domain/services/bookmark_api.rs
use crate::domain::credentials::{Credentials, TokenPair};
use crate::domain::error::{DomainResult, RemoteError};
use crate::domain::row::Row;
use async_trait::async_trait;
use std::fmt::Debug;

/// Remote side of an import: one credential exchange, then one call per row.
#[async_trait]
pub trait BookmarkApi: Send + Sync + Debug {
    /// Exchange user credentials for a delegated token pair.
    async fn authenticate(&self, credentials: &Credentials) -> DomainResult<TokenPair>;

    /// Add a single article. Transient failures are reported as retryable
    /// [`RemoteError`]s, retrying is left to the caller.
    async fn add_bookmark(&self, tokens: &TokenPair, row: &Row) -> Result<(), RemoteError>;
}
