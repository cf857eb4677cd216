//! Error types for precision reduction and policy resolution.

use grid_common::GridError;
use thiserror::Error;

/// Result type for rounding operations.
pub type PrecisionResult<T> = Result<T, PrecisionError>;

/// Errors raised while validating a precision request or applying it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrecisionError {
    /// Neither or both of `nsd` / `dsd` were supplied.
    #[error("invalid precision spec: {0}")]
    InvalidPrecisionSpec(String),

    /// The precision request is neither an integer nor a per-variable mapping.
    #[error("invalid precision type: {0}")]
    InvalidPrecisionType(String),

    /// An exclusion or mapping entry names a variable the dataset does not have.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl PrecisionError {
    /// Create an InvalidPrecisionType error.
    pub fn invalid_type(msg: impl Into<String>) -> Self {
        Self::InvalidPrecisionType(msg.into())
    }
}
