//! Readers that load datasets from disk.

mod zarr_reader;

pub use zarr_reader::ZarrReader;
