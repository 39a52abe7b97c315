//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required argument was missing or empty.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// The entity bag carries no usable identifier.
    #[error("missing identifier for container `{container}`")]
    MissingIdentifier {
        /// The target container.
        container: String,
    },

    /// No entity with the given identifier exists.
    #[error("entity `{id}` not found in container `{container}`")]
    NotFound {
        /// The container searched.
        container: String,
        /// The identifier that was not found.
        id: String,
    },

    /// A stored file or row could not be parsed at all.
    #[error("corrupted record in container `{container}`: {message}")]
    Corrupted {
        /// The container holding the record.
        container: String,
        /// Description of the corruption.
        message: String,
    },
}

impl StorageError {
    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(container: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            container: container.into(),
            id: id.into(),
        }
    }

    /// Creates a corrupted-record error.
    pub fn corrupted(container: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupted {
            container: container.into(),
            message: message.into(),
        }
    }
}
