// src/domain/credentials.rs
use std::fmt;

/// User supplied login for the bookmarking service. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new<S: Into<String>>(identifier: S, secret: S) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

/// Delegated access issued by the remote service for one import run.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub token_secret: String,
}

impl TokenPair {
    pub fn new<S: Into<String>>(token: S, token_secret: S) -> Self {
        Self {
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"***")
            .field("token_secret", &"***")
            .finish()
    }
}
