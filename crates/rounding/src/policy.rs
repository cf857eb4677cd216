//! Policy resolution: turn a dataset-wide precision request into a
//! per-variable rounding plan and apply it.
//!
//! Resolution is pure and validates everything up front. Application rounds
//! every selected variable into a working set and only swaps the results into
//! the dataset once all of them have succeeded, so a failure never leaves a
//! partially rounded dataset behind.

use std::collections::BTreeMap;

use grid_common::{Dataset, EncodingMap, VariableEncoding, VariableNames};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::round_with;
use crate::error::{PrecisionError, PrecisionResult};
use crate::spec::{ExclusionList, Precision, PrecisionSpec};

/// Resolved per-variable precision; contains only variables to be rounded.
pub type PrecisionMap = BTreeMap<String, Precision>;

/// Knobs that shape how a [`PrecisionSpec`] is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionPolicy {
    /// Round coordinate variables too when the spec is global.
    ///
    /// Off by default: coordinates are often used for exact lookups. A
    /// per-variable spec can still name coordinates explicitly.
    #[serde(default)]
    pub include_coordinates: bool,
}

/// Compute which variables are rounded, and with what precision.
///
/// - `Global(p)`: every data variable gets `p` (plus coordinates when
///   `policy.include_coordinates` is set), minus the exclusions.
/// - `PerVariable(map)`: a copy of `map` minus the exclusions. Every key must
///   name a data or coordinate variable.
///
/// Exclusions must name a variable the spec could round: a data variable,
/// or a coordinate when the spec is per-variable or coordinates are opted
/// in. Anything else is rejected with `UnknownVariable`.
pub fn resolve_precision_map(
    names: &VariableNames,
    spec: &PrecisionSpec,
    exclusions: Option<&ExclusionList>,
    policy: &CompressionPolicy,
) -> PrecisionResult<PrecisionMap> {
    if let Some(exclusions) = exclusions {
        let coordinates_eligible =
            policy.include_coordinates || matches!(spec, PrecisionSpec::PerVariable(_));
        let eligible = |name: &str| {
            names.data.contains(name) || (coordinates_eligible && names.coordinates.contains(name))
        };
        if let Some(unknown) = exclusions.iter().find(|&name| !eligible(name)) {
            return Err(PrecisionError::UnknownVariable(unknown.to_string()));
        }
    }

    let mut map = match spec {
        PrecisionSpec::Global(precision) => {
            let mut map: PrecisionMap = names
                .data
                .iter()
                .map(|name| (name.clone(), *precision))
                .collect();
            if policy.include_coordinates {
                map.extend(names.coordinates.iter().map(|name| (name.clone(), *precision)));
            }
            map
        }
        PrecisionSpec::PerVariable(requested) => {
            if let Some(unknown) = requested.keys().find(|name| !names.contains(name)) {
                return Err(PrecisionError::UnknownVariable(unknown.clone()));
            }
            requested.clone()
        }
    };

    if let Some(exclusions) = exclusions {
        map.retain(|name, _| !exclusions.contains(name));
    }

    Ok(map)
}

/// Round every variable named in `map` and store the results in `dataset`.
///
/// All variables are rounded before any is replaced; on error the dataset is
/// left as it was.
pub fn apply_compression_plan(dataset: &mut Dataset, map: &PrecisionMap) -> PrecisionResult<()> {
    let mut rounded = Vec::with_capacity(map.len());

    for (name, precision) in map {
        let source = dataset
            .variable(name)
            .ok_or_else(|| PrecisionError::UnknownVariable(name.clone()))?;

        debug!(
            variable = %name,
            precision = %precision,
            dtype = %source.data_type(),
            elements = source.len(),
            "Rounding variable"
        );
        rounded.push(round_with(source, *precision));
    }

    for array in rounded {
        dataset.replace_variable(array)?;
    }

    Ok(())
}

/// Flag every variable, rounded or not, for lossless compression.
pub fn lossless_encoding(dataset: &Dataset) -> EncodingMap {
    dataset
        .variables()
        .map(|v| (v.name().to_string(), VariableEncoding::lossless()))
        .collect()
}

/// A validated rounding map together with the encoding to write with.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionPlan {
    pub precision: PrecisionMap,
    pub encoding: EncodingMap,
}

impl CompressionPlan {
    /// Resolve `spec` against `dataset` without touching it.
    pub fn build(
        dataset: &Dataset,
        spec: &PrecisionSpec,
        exclusions: Option<&ExclusionList>,
        policy: &CompressionPolicy,
    ) -> PrecisionResult<Self> {
        let precision = resolve_precision_map(&dataset.variable_names(), spec, exclusions, policy)?;
        let encoding = lossless_encoding(dataset);

        info!(
            rounded = precision.len(),
            untouched = dataset.len() - precision.len(),
            "Resolved compression plan"
        );

        Ok(Self {
            precision,
            encoding,
        })
    }

    /// Apply the rounding half of the plan to `dataset`.
    pub fn apply(&self, dataset: &mut Dataset) -> PrecisionResult<()> {
        apply_compression_plan(dataset, &self.precision)
    }

    /// Names of the variables this plan rounds.
    pub fn rounded_variables(&self) -> impl Iterator<Item = &str> {
        self.precision.keys().map(String::as_str)
    }
}
