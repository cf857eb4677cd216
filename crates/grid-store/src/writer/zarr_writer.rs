//! Zarr V3 writer for datasets.
//!
//! A dataset becomes one group at the output path. Every variable is written
//! as a child array at `/<name>` with its dimension names recorded in the
//! `_ARRAY_DIMENSIONS` attribute. Variables whose encoding asks for lossless
//! compression get the configured bytes-to-bytes codec.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use grid_common::{ArrayData, Dataset, EncodingMap, NumericArray};
use tracing::{debug, info, warn};
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::codec::bytes_to_bytes::gzip::GzipCodec;
use zarrs::array::codec::BytesToBytesCodecTraits;
use zarrs::array::{Array, ArrayBuilder, DataType, Element, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs_filesystem::FilesystemStore;

use crate::config::{LosslessCodec, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::{ARRAY_DIMENSIONS_ATTR, COORDS_ATTR, DATA_VARS_ATTR};

/// Result of writing a dataset store.
#[derive(Debug, Clone)]
pub struct ZarrWriteResult {
    /// Root of the written store.
    pub path: PathBuf,
    /// Variables written, coordinates first.
    pub variables: Vec<String>,
    /// In-memory size of all variables.
    pub raw_bytes: u64,
    /// Total size of all files in the store.
    pub bytes_on_disk: u64,
}

impl ZarrWriteResult {
    /// Raw size divided by size on disk.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_on_disk == 0 {
            return 0.0;
        }
        self.raw_bytes as f64 / self.bytes_on_disk as f64
    }
}

/// Writer for creating Zarr V3 stores from datasets.
pub struct ZarrWriter {
    config: StoreConfig,
}

impl ZarrWriter {
    /// Create a new ZarrWriter with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Check that `path` can receive a store without modifying anything.
    ///
    /// Succeeds when the path is absent, an empty directory, or an existing
    /// Zarr store while `overwrite` is set.
    pub fn check_output(&self, path: &Path) -> StoreResult<()> {
        self.config.validate()?;

        if !path.exists() {
            return Ok(());
        }
        if path.is_dir() && std::fs::read_dir(path)?.next().is_none() {
            return Ok(());
        }
        if self.config.overwrite && is_zarr_store(path) {
            return Ok(());
        }
        Err(StoreError::OutputExists(path.display().to_string()))
    }

    /// Write `dataset` to a new store at `path`.
    ///
    /// Variables missing from `encoding` are stored without a codec.
    pub fn write(
        &self,
        dataset: &Dataset,
        encoding: &EncodingMap,
        path: &Path,
    ) -> StoreResult<ZarrWriteResult> {
        self.check_output(path)?;
        for var in dataset.variables() {
            validate_node_name(var.name())?;
            if var.shape().is_empty() {
                return Err(StoreError::UnsupportedShape {
                    variable: var.name().to_string(),
                    message: "scalar variables are not supported".to_string(),
                });
            }
        }

        if is_zarr_store(path) {
            warn!(path = %path.display(), "Replacing existing Zarr store");
            std::fs::remove_dir_all(path)?;
        }
        std::fs::create_dir_all(path)?;

        let store = Arc::new(
            FilesystemStore::new(path).map_err(|e| StoreError::open_failed(path, e))?,
        );

        // Group metadata carries the global attributes and the variable roles
        let mut attrs = dataset.attributes.clone();
        attrs.insert(
            DATA_VARS_ATTR.to_string(),
            serde_json::json!(dataset.data_var_names().collect::<Vec<_>>()),
        );
        attrs.insert(
            COORDS_ATTR.to_string(),
            serde_json::json!(dataset.coord_names().collect::<Vec<_>>()),
        );

        let group = GroupBuilder::new()
            .attributes(attrs)
            .build(store.clone(), "/")
            .map_err(|e| StoreError::write_failed("/", e))?;
        group
            .store_metadata()
            .map_err(|e| StoreError::write_failed("/", e))?;

        let mut variables = Vec::with_capacity(dataset.len());
        for var in dataset.variables() {
            let lossless = encoding.get(var.name()).is_some_and(|e| e.lossless);
            self.write_variable(store.clone(), var, lossless)?;
            variables.push(var.name().to_string());
        }

        let result = ZarrWriteResult {
            path: path.to_path_buf(),
            variables,
            raw_bytes: dataset.size_in_bytes() as u64,
            bytes_on_disk: directory_size(path),
        };

        info!(
            path = %path.display(),
            variables = result.variables.len(),
            raw_bytes = result.raw_bytes,
            bytes_on_disk = result.bytes_on_disk,
            ratio = result.compression_ratio(),
            codec = %self.config.codec,
            "Wrote Zarr store"
        );

        Ok(result)
    }

    /// Write one variable as a child array of the root group.
    fn write_variable(
        &self,
        store: Arc<FilesystemStore>,
        var: &NumericArray,
        lossless: bool,
    ) -> StoreResult<()> {
        match var.data() {
            ArrayData::Float32(v) => {
                self.store_elements(store, var, DataType::Float32, FillValue::from(f32::NAN), v, lossless)
            }
            ArrayData::Float64(v) => {
                self.store_elements(store, var, DataType::Float64, FillValue::from(f64::NAN), v, lossless)
            }
            ArrayData::Int32(v) => {
                self.store_elements(store, var, DataType::Int32, FillValue::from(0i32), v, lossless)
            }
            ArrayData::Int64(v) => {
                self.store_elements(store, var, DataType::Int64, FillValue::from(0i64), v, lossless)
            }
        }
    }

    fn store_elements<T: Element>(
        &self,
        store: Arc<FilesystemStore>,
        var: &NumericArray,
        data_type: DataType,
        fill_value: FillValue,
        elements: &[T],
        lossless: bool,
    ) -> StoreResult<()> {
        let name = var.name();
        let array = self.build_array(store, var, data_type, fill_value, lossless)?;

        array
            .store_metadata()
            .map_err(|e| StoreError::write_failed(name, e))?;

        let shape: Vec<u64> = var.shape().iter().map(|&n| n as u64).collect();
        let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)
            .map_err(|e| StoreError::write_failed(name, e))?;

        array
            .store_array_subset_elements(&subset, elements)
            .map_err(|e| StoreError::write_failed(name, e))?;

        debug!(
            variable = name,
            dtype = var.data_type().as_str(),
            shape = ?var.shape(),
            lossless,
            "Stored variable"
        );
        Ok(())
    }

    /// Build a Zarr array for `var` with the configured settings.
    fn build_array(
        &self,
        store: Arc<FilesystemStore>,
        var: &NumericArray,
        data_type: DataType,
        fill_value: FillValue,
        lossless: bool,
    ) -> StoreResult<Array<FilesystemStore>> {
        let name = var.name();
        let mut attrs = var.attributes.clone();
        attrs.insert(
            ARRAY_DIMENSIONS_ATTR.to_string(),
            serde_json::json!(var.dimensions()),
        );

        let shape: Vec<u64> = var.shape().iter().map(|&n| n as u64).collect();
        let chunk_shape: Vec<u64> = var
            .shape()
            .iter()
            .map(|&n| n.min(self.config.chunk_size).max(1) as u64)
            .collect();
        let chunk_grid: zarrs::array::ChunkGrid = chunk_shape
            .try_into()
            .map_err(|e| StoreError::ConfigError(format!("{:?}", e)))?;

        let mut binding = ArrayBuilder::new(shape, data_type, chunk_grid, fill_value);
        let mut builder = binding.attributes(attrs);

        if lossless && self.config.codec != LosslessCodec::None {
            let codec = self.create_compression_codec(var.data_type().element_size())?;
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        builder
            .build(store, &format!("/{}", name))
            .map_err(|e| StoreError::write_failed(name, e))
    }

    /// Create the compression codec based on configuration.
    fn create_compression_codec(
        &self,
        element_size: usize,
    ) -> StoreResult<Arc<dyn BytesToBytesCodecTraits>> {
        let level = self.config.compression_level;

        let compressor = match self.config.codec {
            LosslessCodec::None => {
                return Err(StoreError::ConfigError(
                    "No compression configured".to_string(),
                ))
            }
            LosslessCodec::Gzip => {
                let codec = GzipCodec::new(u32::from(level))
                    .map_err(|e| StoreError::ConfigError(e.to_string()))?;
                return Ok(Arc::new(codec));
            }
            LosslessCodec::BloscLz4 => BloscCompressor::LZ4,
            LosslessCodec::BloscZstd => BloscCompressor::Zstd,
        };

        let level = BloscCompressionLevel::try_from(level)
            .map_err(|_| StoreError::ConfigError("Invalid compression level".to_string()))?;

        let shuffle = if self.config.shuffle {
            BloscShuffleMode::Shuffle
        } else {
            BloscShuffleMode::NoShuffle
        };

        // typesize is required when shuffle is enabled
        let typesize = self.config.shuffle.then_some(element_size);

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}

/// A directory holding Zarr V3 root metadata.
/// Each variable becomes a direct child of the root group, so its name must
/// be a single, non-reserved path segment.
fn validate_node_name(name: &str) -> StoreResult<()> {
    let problem = if name.is_empty() {
        Some("name is empty")
    } else if name.contains('/') {
        Some("name contains '/'")
    } else if name == "." || name == ".." {
        Some("name is a relative path segment")
    } else if name.starts_with("__") {
        Some("names starting with '__' are reserved")
    } else {
        None
    };

    match problem {
        Some(message) => Err(StoreError::InvalidName {
            variable: name.to_string(),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn is_zarr_store(path: &Path) -> bool {
    path.is_dir() && path.join("zarr.json").is_file()
}

/// Sum of the sizes of all files below `path`.
fn directory_size(path: &Path) -> u64 {
    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::VariableEncoding;
    use test_utils::{scratch_dir, temperature_array, velocity_dataset};

    fn lossless_for(ds: &Dataset) -> EncodingMap {
        ds.variables()
            .map(|v| (v.name().to_string(), VariableEncoding::lossless()))
            .collect()
    }

    #[test]
    fn test_zarr_writer_simple() {
        let temp_dir = scratch_dir();
        let path = temp_dir.path().join("simple.zarr");

        let config = StoreConfig {
            codec: LosslessCodec::None,
            ..Default::default()
        };
        let ds = velocity_dataset(10, 8);
        let result = ZarrWriter::new(config)
            .write(&ds, &lossless_for(&ds), &path)
            .expect("Failed to write");

        assert_eq!(result.variables, vec!["x", "y", "THETA", "UVEL", "VVEL", "WVEL"]);
        assert_eq!(result.raw_bytes, ds.size_in_bytes() as u64);
        assert!(result.bytes_on_disk > 0);
        assert!(path.join("zarr.json").is_file());
        assert!(path.join("UVEL").join("zarr.json").is_file());
    }

    #[test]
    fn test_zarr_writer_with_blosc() {
        let temp_dir = scratch_dir();
        let path = temp_dir.path().join("blosc.zarr");

        let config = StoreConfig {
            codec: LosslessCodec::BloscZstd,
            compression_level: 1,
            chunk_size: 32,
            ..Default::default()
        };
        let ds = velocity_dataset(100, 80);
        let result = ZarrWriter::new(config)
            .write(&ds, &lossless_for(&ds), &path)
            .expect("Failed to write");

        assert_eq!(result.variables.len(), 6);
    }

    #[test]
    fn test_existing_path_is_refused() {
        let temp_dir = scratch_dir();
        let path = temp_dir.path().join("occupied");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("notes.txt"), "keep me").unwrap();

        let ds = velocity_dataset(4, 4);
        let config = StoreConfig {
            overwrite: true,
            ..Default::default()
        };
        let err = ZarrWriter::new(config)
            .write(&ds, &lossless_for(&ds), &path)
            .unwrap_err();

        assert!(matches!(err, StoreError::OutputExists(_)));
        assert!(path.join("notes.txt").is_file());
    }

    #[test]
    fn test_overwrite_replaces_store() {
        let temp_dir = scratch_dir();
        let path = temp_dir.path().join("replace.zarr");
        let ds = velocity_dataset(4, 4);

        let writer = ZarrWriter::new(StoreConfig::default());
        writer.write(&ds, &lossless_for(&ds), &path).unwrap();
        assert!(matches!(
            writer.write(&ds, &lossless_for(&ds), &path),
            Err(StoreError::OutputExists(_))
        ));

        let overwriting = ZarrWriter::new(StoreConfig {
            overwrite: true,
            ..Default::default()
        });
        let mut single = Dataset::new();
        single.add_data_var(temperature_array(3, 3)).unwrap();
        overwriting
            .write(&single, &lossless_for(&single), &path)
            .unwrap();

        assert!(path.join("T2M").is_dir());
        assert!(!path.join("UVEL").exists());
    }

    #[test]
    fn test_scalar_variable_rejected() {
        let temp_dir = scratch_dir();
        let path = temp_dir.path().join("scalar.zarr");

        let scalar = NumericArray::new("s", Vec::<String>::new(), vec![], vec![1.0f64]).unwrap();
        let mut ds = Dataset::new();
        ds.add_data_var(scalar).unwrap();

        let err = ZarrWriter::new(StoreConfig::default())
            .write(&ds, &EncodingMap::new(), &path)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedShape { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_unusable_variable_names_rejected() {
        let temp_dir = scratch_dir();

        for (i, name) in ["", "a/b", "..", "__meta"].into_iter().enumerate() {
            let path = temp_dir.path().join(format!("bad{}.zarr", i));
            let var = NumericArray::new(name, ["x"], vec![2], vec![1.0f64, 2.0]).unwrap();
            let mut ds = Dataset::new();
            ds.add_data_var(var).unwrap();

            let err = ZarrWriter::new(StoreConfig::default())
                .write(&ds, &EncodingMap::new(), &path)
                .unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidName { ref variable, .. } if variable == name),
                "name {:?} gave {:?}",
                name,
                err
            );
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_compression_ratio() {
        let result = ZarrWriteResult {
            path: PathBuf::from("x.zarr"),
            variables: vec![],
            raw_bytes: 1000,
            bytes_on_disk: 250,
        };
        assert_eq!(result.compression_ratio(), 4.0);
    }
}
