//! Zarr writer for persisting compressed datasets.

mod zarr_writer;

pub use zarr_writer::{ZarrWriteResult, ZarrWriter};
