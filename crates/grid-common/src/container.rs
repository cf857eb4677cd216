//! Tagged input containers for the compression entry points.

use serde::{Deserialize, Serialize};

use crate::array::NumericArray;
use crate::dataset::Dataset;
use crate::error::{GridError, GridResult};

/// The two kinds of input a caller can hand over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    SingleArray,
    Collection,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleArray => "single array",
            Self::Collection => "collection",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Either a single numeric array or a named collection of arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayContainer {
    Single(NumericArray),
    Collection(Dataset),
}

impl ArrayContainer {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Single(_) => ContainerKind::SingleArray,
            Self::Collection(_) => ContainerKind::Collection,
        }
    }

    /// Unwrap a single array, failing with `WrongContainerKind` otherwise.
    pub fn into_single(self) -> GridResult<NumericArray> {
        match self {
            Self::Single(array) => Ok(array),
            other => Err(GridError::WrongContainerKind {
                expected: ContainerKind::SingleArray,
                found: other.kind(),
            }),
        }
    }

    /// Unwrap a collection, failing with `WrongContainerKind` otherwise.
    pub fn into_collection(self) -> GridResult<Dataset> {
        match self {
            Self::Collection(dataset) => Ok(dataset),
            other => Err(GridError::WrongContainerKind {
                expected: ContainerKind::Collection,
                found: other.kind(),
            }),
        }
    }
}

impl From<NumericArray> for ArrayContainer {
    fn from(array: NumericArray) -> Self {
        Self::Single(array)
    }
}

impl From<Dataset> for ArrayContainer {
    fn from(dataset: Dataset) -> Self {
        Self::Collection(dataset)
    }
}
