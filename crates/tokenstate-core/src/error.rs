//! Error types for the tokenstate reducer pipeline.

use thiserror::Error;

use crate::entity::EntityKind;

/// Errors that can occur during setup or event reduction.
#[derive(Debug, Error)]
pub enum ReducerError {
    #[error("malformed event: field '{field}': {reason}")]
    MalformedEvent { field: String, reason: String },

    #[error("schema is missing the required index on {fields:?}")]
    MissingIndex { fields: Vec<String> },

    #[error("record '{id}' has kind {actual}, expected {expected}")]
    KindMismatch {
        id: String,
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

impl ReducerError {
    /// Build a `MalformedEvent` error for a named event field.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error is a malformed upstream event.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEvent { .. })
    }

    /// Returns `true` if the error is a fatal setup-time configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingIndex { .. })
    }
}
