//! Error types for builder operations.

use thiserror::Error;

use crate::placement::PlacementError;

/// Result type for builder operations.
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Errors that can occur in builder operations.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Element not found in the document.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid operation on an element or the store.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A placement was rejected by the canvas bounds.
    #[error("Placement rejected: {0}")]
    Placement(#[from] PlacementError),

    /// An import document could not be used.
    #[error("Import failed: {0}")]
    Import(#[from] ImportErrors),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Human-readable messages explaining why an import failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ImportErrors(pub Vec<String>);

impl ImportErrors {
    /// A single-message error list.
    #[must_use]
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    /// The messages, in the order they were raised.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}
