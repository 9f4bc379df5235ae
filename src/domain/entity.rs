//! Domain Layer - Core Entity Trait
//!
//! Basic contract for list entities and the error type shared by stores.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// Client-side identity of the entity
    type Key: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's client-side key
    fn key(&self) -> Self::Key;
}

/// Common result type for store operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Store-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::NotFound("grocery 7".to_string());
        assert_eq!(err.to_string(), "Not found: grocery 7");

        let err = DomainError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
