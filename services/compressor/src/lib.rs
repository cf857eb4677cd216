//! Lossy-then-lossless compression of gridded datasets.
//!
//! A [`Compressor`] rounds variables to a requested precision with the
//! [`rounding`] crate, then writes every variable, rounded or not, through a
//! lossless codec with [`grid_store`].
//!
//! Every check (container kind, precision spec, variable names, output path)
//! runs before the output path is touched.

pub mod config;
pub mod error;

use std::path::{Path, PathBuf};

use grid_common::{ArrayContainer, Dataset};
use grid_store::{ZarrWriteResult, ZarrWriter};
use rounding::{round_variable, CompressionPlan, ExclusionList, Precision, PrecisionSpec};
use serde::Serialize;
use tracing::{debug, info};

pub use config::{CompressorConfig, JobConfig};
pub use error::{CompressError, CompressResult};

/// Summary of one compression call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionReport {
    pub output: PathBuf,
    pub variables_written: usize,
    /// Names of the variables whose values were rounded.
    pub variables_rounded: Vec<String>,
    pub raw_bytes: u64,
    pub bytes_on_disk: u64,
}

impl CompressionReport {
    fn new(write: ZarrWriteResult, variables_rounded: Vec<String>) -> Self {
        Self {
            variables_written: write.variables.len(),
            variables_rounded,
            raw_bytes: write.raw_bytes,
            bytes_on_disk: write.bytes_on_disk,
            output: write.path,
        }
    }

    /// Raw size divided by size on disk.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_on_disk == 0 {
            return 0.0;
        }
        self.raw_bytes as f64 / self.bytes_on_disk as f64
    }
}

/// Rounds datasets and writes them as compressed Zarr stores.
pub struct Compressor {
    config: CompressorConfig,
    writer: ZarrWriter,
}

impl Compressor {
    pub fn new(config: CompressorConfig) -> Self {
        let writer = ZarrWriter::new(config.store.clone());
        Self { config, writer }
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Round a single array to `decimal_places` and write it.
    ///
    /// Fails with `WrongContainerKind` if `container` is a collection.
    pub fn compress_array(
        &self,
        container: impl Into<ArrayContainer>,
        out_path: impl AsRef<Path>,
        decimal_places: i32,
    ) -> CompressResult<CompressionReport> {
        let out_path = out_path.as_ref();
        let array = container.into().into_single()?;
        self.writer.check_output(out_path)?;

        let rounded = round_variable(
            &array,
            Precision::DecimalPlaces(decimal_places),
            self.config.keep_attrs,
        );
        let name = rounded.name().to_string();
        debug!(variable = %name, decimal_places, "Rounded array");

        let mut ds = Dataset::new();
        ds.add_data_var(rounded)?;
        let encoding = rounding::lossless_encoding(&ds);

        let write = self.writer.write(&ds, &encoding, out_path)?;
        Ok(CompressionReport::new(write, vec![name]))
    }

    /// Round the variables of a dataset per `spec` and write them all.
    ///
    /// Fails with `WrongContainerKind` if `container` is a single array.
    pub fn compress_collection(
        &self,
        container: impl Into<ArrayContainer>,
        out_path: impl AsRef<Path>,
        spec: &PrecisionSpec,
        exclusions: Option<&ExclusionList>,
    ) -> CompressResult<CompressionReport> {
        let out_path = out_path.as_ref();
        let mut ds = container.into().into_collection()?;

        let plan = CompressionPlan::build(&ds, spec, exclusions, &self.config.policy)?;
        self.writer.check_output(out_path)?;

        plan.apply(&mut ds)?;
        if !self.config.keep_attrs {
            for name in plan.rounded_variables() {
                if let Some(var) = ds.variable(name) {
                    let mut stripped = var.clone();
                    stripped.attributes.clear();
                    ds.replace_variable(stripped)?;
                }
            }
        }

        let write = self.writer.write(&ds, &plan.encoding, out_path)?;
        let rounded = plan.rounded_variables().map(str::to_string).collect();
        let report = CompressionReport::new(write, rounded);

        info!(
            output = %report.output.display(),
            rounded = report.variables_rounded.len(),
            written = report.variables_written,
            ratio = report.compression_ratio(),
            "Compressed dataset"
        );
        Ok(report)
    }

    /// Open `in_path` and compress it into `out_path`.
    ///
    /// `in_path` may be a Zarr store, or a NetCDF file when built with the
    /// `netcdf` feature.
    pub fn compress_file(
        &self,
        in_path: impl AsRef<Path>,
        out_path: impl AsRef<Path>,
        spec: &PrecisionSpec,
        exclusions: Option<&ExclusionList>,
    ) -> CompressResult<CompressionReport> {
        let in_path = in_path.as_ref();
        info!(input = %in_path.display(), "Opening input");
        let ds = grid_store::open_dataset(in_path)?;
        self.compress_collection(ds, out_path, spec, exclusions)
    }
}
