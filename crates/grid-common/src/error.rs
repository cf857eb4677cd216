//! Error types for the array data model.

use thiserror::Error;

use crate::container::ContainerKind;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while building or addressing arrays and datasets.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// A collection was passed where a single array was required, or the reverse.
    #[error("expected a {expected}, got a {found}")]
    WrongContainerKind {
        expected: ContainerKind,
        found: ContainerKind,
    },

    #[error("shape mismatch for '{name}': {message}")]
    ShapeMismatch { name: String, message: String },

    #[error("variable '{0}' already exists in the dataset")]
    DuplicateVariable(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),
}

impl GridError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            message: message.into(),
        }
    }
}
