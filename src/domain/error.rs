// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote request failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl DomainError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            DomainError::InvalidInput(msg) => {
                DomainError::InvalidInput(format!("{}: {}", context.into(), msg))
            }
            DomainError::Configuration(msg) => {
                DomainError::Configuration(format!("{}: {}", context.into(), msg))
            }
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context.into(), msg)),
            err => DomainError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a single request against the bookmarking proxy.
///
/// Only [`RemoteError::RateLimited`] and [`RemoteError::Server`] are transient;
/// everything else is final for the row that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Rate limited by remote service (HTTP 429)")]
    RateLimited,

    #[error("Remote server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Failed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl RemoteError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => RemoteError::RateLimited,
            500..=599 => RemoteError::Server { status, message },
            _ => RemoteError::Rejected { status, message },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::RateLimited | RemoteError::Server { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_http_429_when_classify_then_retryable() {
        let err = RemoteError::from_status(429, "slow down");
        assert_eq!(err, RemoteError::RateLimited);
        assert!(err.is_retryable());
    }

    #[test]
    fn given_5xx_when_classify_then_retryable_server_error() {
        for status in [500, 502, 503, 599] {
            let err = RemoteError::from_status(status, "boom");
            assert!(err.is_retryable(), "status {} should be retryable", status);
        }
    }

    #[test]
    fn given_other_4xx_when_classify_then_permanent() {
        for status in [400, 401, 403, 404, 422] {
            let err = RemoteError::from_status(status, "nope");
            assert!(!err.is_retryable(), "status {} should be permanent", status);
        }
        assert!(!RemoteError::Network("timeout".into()).is_retryable());
        assert!(!RemoteError::NotAuthenticated.is_retryable());
        assert!(!RemoteError::Failed("invalid url".into()).is_retryable());
    }

    #[test]
    fn given_error_when_context_then_message_is_prefixed() {
        let err = DomainError::InvalidInput("bad".into()).context("reading csv");
        assert_eq!(err.to_string(), "Invalid input: reading csv: bad");
    }
}
