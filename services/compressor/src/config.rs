//! Compressor configuration and YAML job files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_store::StoreConfig;
use rounding::{
    CompressionPolicy, ExclusionList, Precision, PrecisionError, PrecisionResult, PrecisionSpec,
};
use serde::{Deserialize, Serialize};

/// Settings shared by every compression call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// How the output store is written.
    pub store: StoreConfig,

    /// How global precision specs are resolved.
    pub policy: CompressionPolicy,

    /// Keep variable attributes on rounded variables.
    pub keep_attrs: bool,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            policy: CompressionPolicy::default(),
            keep_attrs: true,
        }
    }
}

impl CompressorConfig {
    /// Load configuration from environment variables.
    ///
    /// Store settings come from [`StoreConfig::from_env`]; the policy from
    /// `COMPRESS_INCLUDE_COORDINATES` and `COMPRESS_KEEP_ATTRS`.
    pub fn from_env() -> Self {
        let mut config = Self {
            store: StoreConfig::from_env(),
            ..Default::default()
        };

        if let Ok(val) = std::env::var("COMPRESS_INCLUDE_COORDINATES") {
            config.policy.include_coordinates = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var("COMPRESS_KEEP_ATTRS") {
            config.keep_attrs = val.eq_ignore_ascii_case("true") || val == "1";
        }

        config
    }
}

/// Exclusions as written in a job file: one name or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeEntry {
    One(String),
    Many(Vec<String>),
}

impl From<ExcludeEntry> for ExclusionList {
    fn from(entry: ExcludeEntry) -> Self {
        match entry {
            ExcludeEntry::One(name) => ExclusionList::from(name),
            ExcludeEntry::Many(names) => ExclusionList::from(names),
        }
    }
}

/// A compression job loaded from YAML.
///
/// ```yaml
/// input: ocean_state.zarr
/// output: ocean_state_rounded.zarr
/// precision:
///   UVEL: 2
///   VVEL: 2
///   WVEL: { nsd: 3 }
/// exclude: THETA
/// store:
///   codec: blosc_zstd
///   overwrite: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Integer or per-variable mapping.
    #[serde(default)]
    pub precision: Option<serde_json::Value>,

    /// Global significant-figure precision, instead of `precision`.
    #[serde(default)]
    pub significant_digits: Option<u32>,

    #[serde(default)]
    pub exclude: Option<ExcludeEntry>,

    #[serde(default)]
    pub include_coordinates: Option<bool>,

    #[serde(default)]
    pub keep_attrs: Option<bool>,

    /// Replaces the store settings when present.
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

impl JobConfig {
    /// Load a job from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse job file: {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The precision spec this job asks for.
    ///
    /// Exactly one of `precision` and `significant_digits` must be set.
    pub fn precision_spec(&self) -> PrecisionResult<PrecisionSpec> {
        match (&self.precision, self.significant_digits) {
            (Some(value), None) => PrecisionSpec::from_json(value),
            (None, Some(nsd)) => Ok(PrecisionSpec::Global(Precision::SignificantDigits(nsd))),
            (Some(_), Some(_)) => Err(PrecisionError::InvalidPrecisionSpec(
                "set either precision or significant_digits, not both".to_string(),
            )),
            (None, None) => Err(PrecisionError::InvalidPrecisionSpec(
                "job sets neither precision nor significant_digits".to_string(),
            )),
        }
    }

    pub fn exclusions(&self) -> Option<ExclusionList> {
        self.exclude.clone().map(ExclusionList::from)
    }

    /// Layer this job's overrides on top of `base`.
    pub fn apply_to(&self, mut base: CompressorConfig) -> CompressorConfig {
        if let Some(store) = &self.store {
            base.store = store.clone();
        }
        if let Some(include) = self.include_coordinates {
            base.policy.include_coordinates = include;
        }
        if let Some(keep) = self.keep_attrs {
            base.keep_attrs = keep;
        }
        base
    }
}
