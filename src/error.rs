//! # Depot Error Types
//!
//! Structured error handling for the refresh pipeline using `thiserror`.
//! Every error knows whether retrying the notification that produced it could
//! ever succeed, which drives the queue manager's retry policy.

use crate::config::ConfigurationError;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepotError {
    /// Malformed group, artifact or version identifiers
    #[error("Validation error: {0}")]
    Validation(String),

    /// Coordinates already claimed by a different project id
    #[error("{group_id}:{artifact_id} coordinates already registered with project {project_id}")]
    CoordinateConflict {
        group_id: String,
        artifact_id: String,
        project_id: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Store error: {operation}: {message}")]
    Store { operation: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Handler error: {artifact_type}: {message}")]
    Handler {
        artifact_type: String,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DepotError {
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn handler(artifact_type: impl ToString, message: impl Into<String>) -> Self {
        Self::Handler {
            artifact_type: artifact_type.to_string(),
            message: message.into(),
        }
    }

    /// Whether a notification failing with this error may succeed on a later attempt.
    ///
    /// Malformed input, coordinate conflicts and upstream not-found conditions need the
    /// caller to republish; storage hiccups, repository outages and handler failures
    /// are treated as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            DepotError::Validation(_)
            | DepotError::CoordinateConflict { .. }
            | DepotError::NotFound(_)
            | DepotError::Serialization(_)
            | DepotError::Configuration(_) => false,
            DepotError::Repository(e) => e.is_retryable(),
            DepotError::Store { .. }
            | DepotError::Database(_)
            | DepotError::Handler { .. }
            | DepotError::Internal(_) => true,
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for DepotError {
    fn from(e: sqlx::Error) -> Self {
        DepotError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DepotError>;
