//! Zarr V3 reader for datasets written by [`ZarrWriter`](crate::ZarrWriter).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use grid_common::{ArrayData, Attributes, Dataset, NumericArray};
use tracing::debug;
use zarrs::array::{Array, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs::group::Group;
use zarrs_filesystem::FilesystemStore;

use crate::error::{StoreError, StoreResult};
use crate::{ARRAY_DIMENSIONS_ATTR, COORDS_ATTR, DATA_VARS_ATTR};

/// An opened Zarr store.
pub struct ZarrReader {
    path: PathBuf,
    store: Arc<FilesystemStore>,
    attributes: Attributes,
    data_vars: Vec<String>,
    coords: Vec<String>,
}

impl ZarrReader {
    /// Open the group at `path` and read its variable lists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(StoreError::open_failed(path, "not a directory"));
        }

        let store = Arc::new(
            FilesystemStore::new(path).map_err(|e| StoreError::open_failed(path, e))?,
        );
        let group = Group::open(store.clone(), "/").map_err(|e| StoreError::open_failed(path, e))?;

        let mut attributes = group.attributes().clone();
        let data_vars = take_name_list(&mut attributes, DATA_VARS_ATTR)?;
        let coords = take_name_list(&mut attributes, COORDS_ATTR)?;

        Ok(Self {
            path: path.to_path_buf(),
            store,
            attributes,
            data_vars,
            coords,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Global attributes, without the variable lists.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn data_var_names(&self) -> &[String] {
        &self.data_vars
    }

    pub fn coord_names(&self) -> &[String] {
        &self.coords
    }

    /// Read a single variable.
    pub fn read_variable(&self, name: &str) -> StoreResult<NumericArray> {
        let array = Array::open(self.store.clone(), &format!("/{}", name))
            .map_err(|e| StoreError::read_failed(name, e))?;

        let shape: Vec<usize> = array.shape().iter().map(|&n| n as usize).collect();
        let subset = ArraySubset::new_with_shape(array.shape().to_vec());

        let data = match array.data_type() {
            DataType::Float32 => ArrayData::Float32(retrieve(&array, &subset, name)?),
            DataType::Float64 => ArrayData::Float64(retrieve(&array, &subset, name)?),
            DataType::Int32 => ArrayData::Int32(retrieve(&array, &subset, name)?),
            DataType::Int64 => ArrayData::Int64(retrieve(&array, &subset, name)?),
            other => {
                return Err(StoreError::UnsupportedDataType {
                    variable: name.to_string(),
                    data_type: format!("{:?}", other),
                })
            }
        };

        let mut attributes = array.attributes().clone();
        let dimensions = match attributes.remove(ARRAY_DIMENSIONS_ATTR) {
            Some(value) => serde_json::from_value::<Vec<String>>(value)
                .map_err(|e| StoreError::read_failed(name, e))?,
            None => (0..shape.len()).map(|i| format!("dim_{}", i)).collect(),
        };

        let mut var = NumericArray::new(name, dimensions, shape, data)
            .map_err(|e| StoreError::read_failed(name, e))?;
        var.attributes = attributes;

        debug!(variable = name, dtype = var.data_type().as_str(), "Read variable");
        Ok(var)
    }

    /// Read every variable into a dataset.
    pub fn read_dataset(&self) -> StoreResult<Dataset> {
        let mut ds = Dataset::new();
        ds.attributes = self.attributes.clone();

        for name in &self.coords {
            ds.add_coord(self.read_variable(name)?)
                .map_err(|e| StoreError::read_failed(name.as_str(), e))?;
        }
        for name in &self.data_vars {
            ds.add_data_var(self.read_variable(name)?)
                .map_err(|e| StoreError::read_failed(name.as_str(), e))?;
        }

        Ok(ds)
    }
}

fn retrieve<T: zarrs::array::ElementOwned>(
    array: &Array<FilesystemStore>,
    subset: &ArraySubset,
    name: &str,
) -> StoreResult<Vec<T>> {
    array
        .retrieve_array_subset_elements::<T>(subset)
        .map_err(|e| StoreError::read_failed(name, e))
}

/// Remove a list-of-names attribute from the group attributes.
fn take_name_list(attributes: &mut Attributes, key: &str) -> StoreResult<Vec<String>> {
    match attributes.remove(key) {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::read_failed("/", e))
        }
        None => Err(StoreError::read_failed(
            "/",
            format!("group is missing the '{}' attribute", key),
        )),
    }
}
