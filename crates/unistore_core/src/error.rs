//! Error types for the query engine.

use thiserror::Error;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in UniStore engine operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] unistore_storage::StorageError),

    /// Query model or schema error.
    #[error("model error: {0}")]
    Model(#[from] unistore_model::ModelError),

    /// A required argument was missing or empty.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// An upsert/replace was attempted with an empty identifier.
    ///
    /// Distinct from "not found": an empty identifier signals a construction
    /// bug in the caller, not a missing row.
    #[error("entity of type `{entity}` carries an empty identifier")]
    EmptyIdentifier {
        /// The entity type involved.
        entity: String,
    },
}

impl CoreError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an empty-identifier error.
    pub fn empty_identifier(entity: impl Into<String>) -> Self {
        Self::EmptyIdentifier {
            entity: entity.into(),
        }
    }
}
