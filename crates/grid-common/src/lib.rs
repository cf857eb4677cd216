//! Common types shared across all grid-compress crates.
//!
//! The model is intentionally small: a [`NumericArray`] is a named,
//! dimension-labeled buffer of numbers, and a [`Dataset`] groups data
//! variables with the coordinate variables that label their axes.
//! [`ArrayContainer`] lets entry points accept either and check the kind
//! explicitly.

pub mod array;
pub mod container;
pub mod dataset;
pub mod encoding;
pub mod error;

pub use array::{ArrayData, Attributes, DataType, NumericArray};
pub use container::{ArrayContainer, ContainerKind};
pub use dataset::{Dataset, VariableKind, VariableNames};
pub use encoding::{EncodingMap, VariableEncoding};
pub use error::{GridError, GridResult};
