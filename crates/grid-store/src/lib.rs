//! Zarr V3 storage for datasets.
//!
//! [`ZarrWriter`] persists a [`Dataset`](grid_common::Dataset) as one Zarr
//! group, applying a lossless codec to each variable its
//! [`EncodingMap`](grid_common::EncodingMap) flags. [`ZarrReader`] loads such
//! a group back. With the `netcdf` feature, [`open_netcdf`] reads NetCDF
//! files as input.
//!
//! # Store layout
//!
//! ```text
//! out.zarr/
//!   zarr.json          group: global attributes, data_vars, coords
//!   x/zarr.json        array: _ARRAY_DIMENSIONS = ["x"]
//!   UVEL/zarr.json     array: _ARRAY_DIMENSIONS = ["y", "x"]
//!   UVEL/c/0/0         chunks
//! ```

pub mod config;
pub mod error;
#[cfg(feature = "netcdf")]
pub mod netcdf_input;
pub mod reader;
pub mod writer;

use std::path::Path;

use grid_common::Dataset;

pub use config::{LosslessCodec, StoreConfig};
pub use error::{StoreError, StoreResult};
#[cfg(feature = "netcdf")]
pub use netcdf_input::open_netcdf;
pub use reader::ZarrReader;
pub use writer::{ZarrWriteResult, ZarrWriter};

/// Array attribute holding dimension names.
pub const ARRAY_DIMENSIONS_ATTR: &str = "_ARRAY_DIMENSIONS";
/// Group attribute listing data variables.
pub const DATA_VARS_ATTR: &str = "data_vars";
/// Group attribute listing coordinate variables.
pub const COORDS_ATTR: &str = "coords";

/// Load a dataset from a Zarr store, or from a NetCDF file when built with
/// the `netcdf` feature.
pub fn open_dataset(path: impl AsRef<Path>) -> StoreResult<Dataset> {
    let path = path.as_ref();

    if path.is_dir() {
        return ZarrReader::open(path)?.read_dataset();
    }

    let is_netcdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "nc" | "nc4" | "netcdf"));

    if !path.exists() {
        return Err(StoreError::open_failed(path, "no such file or directory"));
    }

    if is_netcdf {
        return read_netcdf(path);
    }

    Err(StoreError::UnsupportedInput(path.display().to_string()))
}

#[cfg(feature = "netcdf")]
fn read_netcdf(path: &Path) -> StoreResult<Dataset> {
    open_netcdf(path)
}

#[cfg(not(feature = "netcdf"))]
fn read_netcdf(path: &Path) -> StoreResult<Dataset> {
    Err(StoreError::UnsupportedInput(format!(
        "{}: NetCDF input requires the `netcdf` feature",
        path.display()
    )))
}
