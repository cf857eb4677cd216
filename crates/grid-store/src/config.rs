//! Configuration for dataset stores.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for writing Zarr stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum chunk length along every axis.
    pub chunk_size: usize,

    /// Lossless codec applied to variables whose encoding requests it.
    pub codec: LosslessCodec,

    /// Compression level (0-9).
    pub compression_level: u8,

    /// Enable byte shuffle for Blosc codecs.
    pub shuffle: bool,

    /// Replace an existing Zarr store at the output path.
    pub overwrite: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            codec: LosslessCodec::Gzip,
            compression_level: 4,
            shuffle: true,
            overwrite: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ZARR_CHUNK_SIZE") {
            if let Ok(size) = val.parse() {
                config.chunk_size = size;
            }
        }

        if let Ok(val) = std::env::var("ZARR_COMPRESSION") {
            match val.parse() {
                Ok(codec) => config.codec = codec,
                Err(e) => tracing::warn!(error = %e, "Ignoring ZARR_COMPRESSION"),
            }
        }

        if let Ok(val) = std::env::var("ZARR_COMPRESSION_LEVEL") {
            if let Ok(level) = val.parse() {
                config.compression_level = level;
            }
        }

        if let Ok(val) = std::env::var("ZARR_SHUFFLE") {
            config.shuffle = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("ZARR_OVERWRITE") {
            config.overwrite = parse_flag(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.chunk_size == 0 {
            return Err(StoreError::ConfigError("chunk_size must be > 0".to_string()));
        }

        if self.compression_level > 9 {
            return Err(StoreError::ConfigError(
                "compression_level must be 0-9".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Lossless bytes-to-bytes codec for stored variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosslessCodec {
    /// Store raw bytes.
    None,
    /// Deflate (zlib-compatible).
    #[default]
    Gzip,
    /// Blosc with LZ4.
    BloscLz4,
    /// Blosc with Zstd.
    BloscZstd,
}

impl LosslessCodec {
    /// Get the codec name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::BloscLz4 => "blosc_lz4",
            Self::BloscZstd => "blosc_zstd",
        }
    }
}

impl FromStr for LosslessCodec {
    type Err = StoreError;

    /// Parse a codec name (case-insensitive). `zlib` is accepted for gzip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "gzip" | "zlib" => Ok(Self::Gzip),
            "blosc_lz4" => Ok(Self::BloscLz4),
            "blosc_zstd" => Ok(Self::BloscZstd),
            other => Err(StoreError::ConfigError(format!(
                "unknown codec '{}', expected none, gzip, blosc_lz4 or blosc_zstd",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LosslessCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
