use crate::domain::error::{DomainError, RemoteError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Client setup error: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for InfrastructureError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            InfrastructureError::Timeout(error.to_string())
        } else if error.is_decode() {
            InfrastructureError::Serialization(error.to_string())
        } else if error.is_builder() {
            InfrastructureError::Setup(error.to_string())
        } else {
            InfrastructureError::Network(error.to_string())
        }
    }
}

// Implement conversion from infrastructure errors to domain errors
impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Setup(msg) => DomainError::Configuration(msg),
            err => DomainError::Remote(err.into()),
        }
    }
}

// Transport failures are never retried
impl From<InfrastructureError> for RemoteError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Serialization(msg) => RemoteError::MalformedResponse(msg),
            err => RemoteError::Network(err.to_string()),
        }
    }
}
