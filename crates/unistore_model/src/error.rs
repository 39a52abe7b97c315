//! Error types for the query model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building queries or decoding stored values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The entity type is not registered in the schema registry.
    #[error("unknown entity: {entity}")]
    UnknownEntity {
        /// Name of the entity type.
        entity: String,
    },

    /// A query references a field the entity schema does not declare.
    #[error("unknown field `{field}` on entity `{entity}`")]
    UnknownField {
        /// Name of the entity type.
        entity: String,
        /// The unrecognized field name.
        field: String,
    },

    /// A condition value's kind does not match the declared field kind.
    #[error("kind mismatch on field `{field}`: declared {declared}, got {actual}")]
    KindMismatch {
        /// The field being compared.
        field: String,
        /// The schema-declared kind.
        declared: String,
        /// The kind of the supplied value.
        actual: String,
    },

    /// The query is structurally invalid.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Description of the problem.
        message: String,
    },

    /// A stored string value could not be decoded to its declared kind.
    #[error("decode failure for kind {kind}: {message}")]
    Decode {
        /// The declared field kind.
        kind: String,
        /// Description of the failure.
        message: String,
    },

    /// An entity schema was registered twice.
    #[error("duplicate schema registration: {entity}")]
    DuplicateSchema {
        /// Name of the entity type.
        entity: String,
    },
}

impl ModelError {
    /// Creates an unknown-entity error.
    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        Self::UnknownEntity {
            entity: entity.into(),
        }
    }

    /// Creates an unknown-field error.
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid-query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
