//! Per-variable storage encoding flags handed to the store writer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a single variable should be encoded on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEncoding {
    /// Apply the store's lossless bytes-to-bytes codec to this variable.
    pub lossless: bool,
}

impl VariableEncoding {
    pub fn lossless() -> Self {
        Self { lossless: true }
    }
}

/// Encoding flags keyed by variable name.
pub type EncodingMap = BTreeMap<String, VariableEncoding>;
