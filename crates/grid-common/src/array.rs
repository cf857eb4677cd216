//! Named n-dimensional numeric arrays.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Free-form per-variable or per-dataset metadata.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Element type of an [`ArrayData`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32,
    Float64,
    Int32,
    Int64,
}

impl DataType {
    /// Get the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
        }
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 => 4,
            Self::Float64 | Self::Int64 => 8,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed element buffer in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

impl ArrayData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
        }
    }

    /// Uncompressed size of the buffer in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.len() * self.data_type().element_size()
    }

    /// Apply `f` to every element, computing in `f64` and casting back.
    ///
    /// The result always has the same variant as `self`. Integer results are
    /// cast with saturation; `i64` values beyond 2^53 lose precision.
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> ArrayData {
        match self {
            Self::Float32(v) => Self::Float32(v.iter().map(|&x| f(x as f64) as f32).collect()),
            Self::Float64(v) => Self::Float64(v.iter().map(|&x| f(x)).collect()),
            Self::Int32(v) => Self::Int32(v.iter().map(|&x| f(x as f64) as i32).collect()),
            Self::Int64(v) => Self::Int64(v.iter().map(|&x| f(x as f64) as i64).collect()),
        }
    }

    /// Copy the buffer out as `f64` values.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            Self::Float64(v) => v.clone(),
            Self::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            Self::Int64(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }
}

impl From<Vec<f32>> for ArrayData {
    fn from(v: Vec<f32>) -> Self {
        Self::Float32(v)
    }
}

impl From<Vec<f64>> for ArrayData {
    fn from(v: Vec<f64>) -> Self {
        Self::Float64(v)
    }
}

impl From<Vec<i32>> for ArrayData {
    fn from(v: Vec<i32>) -> Self {
        Self::Int32(v)
    }
}

impl From<Vec<i64>> for ArrayData {
    fn from(v: Vec<i64>) -> Self {
        Self::Int64(v)
    }
}

/// A named, dimension-labeled n-dimensional array.
///
/// The element count always equals the product of `shape`, and there is one
/// dimension name per axis. Both are checked on construction, so any
/// `NumericArray` in hand is internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    name: String,
    dimensions: Vec<String>,
    shape: Vec<usize>,
    data: ArrayData,
    /// Variable metadata (units, long_name, ...).
    pub attributes: Attributes,
}

impl NumericArray {
    /// Create a new array, validating shape against the buffer.
    pub fn new<I, S>(
        name: impl Into<String>,
        dimensions: I,
        shape: Vec<usize>,
        data: impl Into<ArrayData>,
    ) -> GridResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let dimensions: Vec<String> = dimensions.into_iter().map(Into::into).collect();
        let data = data.into();

        if dimensions.len() != shape.len() {
            return Err(GridError::shape_mismatch(
                name,
                format!(
                    "{} dimension names for {} axes",
                    dimensions.len(),
                    shape.len()
                ),
            ));
        }

        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(GridError::shape_mismatch(
                name,
                format!("shape {:?} needs {} elements, got {}", shape, expected, data.len()),
            ));
        }

        Ok(Self {
            name,
            dimensions,
            shape,
            data,
            attributes: Attributes::new(),
        })
    }

    /// Create a one-dimensional coordinate array whose dimension shares its name.
    pub fn coordinate(name: impl Into<String>, data: impl Into<ArrayData>) -> Self {
        let name = name.into();
        let data = data.into();
        Self {
            dimensions: vec![name.clone()],
            shape: vec![data.len()],
            name,
            data,
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Build a new array by applying `f` to every element.
    ///
    /// Name, dimensions, shape, attributes and element type are preserved.
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            name: self.name.clone(),
            dimensions: self.dimensions.clone(),
            shape: self.shape.clone(),
            data: self.data.map_values(f),
            attributes: self.attributes.clone(),
        }
    }
}
