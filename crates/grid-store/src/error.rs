//! Error types for dataset storage.

use thiserror::Error;

/// Errors that can occur while reading or writing a dataset store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open an input store or file.
    #[error("failed to open {path}: {message}")]
    OpenFailed { path: String, message: String },

    /// Failed to read a variable from the store.
    #[error("failed to read '{variable}': {message}")]
    ReadFailed { variable: String, message: String },

    /// Failed to write a variable or store metadata.
    #[error("failed to write '{variable}': {message}")]
    WriteFailed { variable: String, message: String },

    /// The stored array uses an element type we cannot represent.
    #[error("unsupported data type for '{variable}': {data_type}")]
    UnsupportedDataType { variable: String, data_type: String },

    /// The array shape cannot be stored (for example a scalar).
    #[error("unsupported shape for '{variable}': {message}")]
    UnsupportedShape { variable: String, message: String },

    /// The variable name cannot be used as a Zarr node name.
    #[error("invalid variable name '{variable}': {message}")]
    InvalidName { variable: String, message: String },

    /// The output path exists and is not a replaceable store.
    #[error("output path already exists: {0}")]
    OutputExists(String),

    /// The input path is not a format we can read.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create an OpenFailed error.
    pub fn open_failed(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::OpenFailed {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a ReadFailed error.
    pub fn read_failed(variable: impl Into<String>, message: impl ToString) -> Self {
        Self::ReadFailed {
            variable: variable.into(),
            message: message.to_string(),
        }
    }

    /// Create a WriteFailed error.
    pub fn write_failed(variable: impl Into<String>, message: impl ToString) -> Self {
        Self::WriteFailed {
            variable: variable.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
