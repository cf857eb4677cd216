//! Precision requests as supplied by callers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PrecisionError, PrecisionResult};

/// How much precision to keep for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Digits after the decimal point (`dsd`); negative rounds left of it.
    DecimalPlaces(i32),
    /// Significant digits relative to each element's magnitude (`nsd`).
    SignificantDigits(u32),
}

impl Precision {
    /// Build from the two mutually exclusive rounding parameters.
    pub fn from_parts(nsd: Option<u32>, dsd: Option<i32>) -> PrecisionResult<Self> {
        match (nsd, dsd) {
            (Some(nsd), None) => Ok(Self::SignificantDigits(nsd)),
            (None, Some(dsd)) => Ok(Self::DecimalPlaces(dsd)),
            (Some(_), Some(_)) => Err(PrecisionError::InvalidPrecisionSpec(
                "must set either `nsd` or `dsd`, not both".to_string(),
            )),
            (None, None) => Err(PrecisionError::InvalidPrecisionSpec(
                "must set either `nsd` or `dsd`".to_string(),
            )),
        }
    }

    /// Parse a single per-variable value: an integer (decimal places) or an
    /// object holding exactly one of `nsd` / `dsd`.
    pub fn from_json(value: &Value) -> PrecisionResult<Self> {
        match value {
            Value::Number(_) => Ok(Self::DecimalPlaces(json_i32(value)?)),
            Value::Object(obj) => {
                let nsd = obj.get("nsd").map(json_u32).transpose()?;
                let dsd = obj.get("dsd").map(json_i32).transpose()?;
                if let Some(key) = obj.keys().find(|k| *k != "nsd" && *k != "dsd") {
                    return Err(PrecisionError::invalid_type(format!(
                        "unexpected key '{}' in precision object",
                        key
                    )));
                }
                Self::from_parts(nsd, dsd)
            }
            other => Err(PrecisionError::invalid_type(format!(
                "expected an integer or {{nsd|dsd: n}}, got {}",
                other
            ))),
        }
    }
}

impl From<i32> for Precision {
    fn from(decimal_places: i32) -> Self {
        Self::DecimalPlaces(decimal_places)
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecimalPlaces(d) => write!(f, "dsd={}", d),
            Self::SignificantDigits(n) => write!(f, "nsd={}", n),
        }
    }
}

fn json_i32(value: &Value) -> PrecisionResult<i32> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| PrecisionError::invalid_type(format!("expected an integer, got {}", value)))
}

fn json_u32(value: &Value) -> PrecisionResult<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            PrecisionError::invalid_type(format!("expected a non-negative integer, got {}", value))
        })
}

/// A dataset-wide precision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecisionSpec {
    /// Apply one precision to every eligible variable.
    Global(Precision),
    /// Apply precision only to the named variables.
    PerVariable(BTreeMap<String, Precision>),
}

impl PrecisionSpec {
    /// Build a per-variable spec from `(name, precision)` pairs.
    pub fn per_variable<I, K, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Precision>,
    {
        Self::PerVariable(
            entries
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        )
    }

    /// Parse a loosely typed request (config file, CLI).
    ///
    /// An integer is global decimal places; an object maps variable names to
    /// per-variable values (see [`Precision::from_json`]). Anything else fails
    /// with `InvalidPrecisionType`.
    pub fn from_json(value: &Value) -> PrecisionResult<Self> {
        match value {
            Value::Number(_) => Ok(Self::Global(Precision::from_json(value)?)),
            Value::Object(obj) => {
                let mut map = BTreeMap::new();
                for (name, v) in obj {
                    let precision = Precision::from_json(v).map_err(|e| match e {
                        PrecisionError::InvalidPrecisionType(msg) => {
                            PrecisionError::InvalidPrecisionType(format!("{}: {}", name, msg))
                        }
                        other => other,
                    })?;
                    map.insert(name.clone(), precision);
                }
                Ok(Self::PerVariable(map))
            }
            other => Err(PrecisionError::invalid_type(format!(
                "precision must be an integer or a mapping, got {}",
                other
            ))),
        }
    }
}

impl From<i32> for PrecisionSpec {
    fn from(decimal_places: i32) -> Self {
        Self::Global(Precision::DecimalPlaces(decimal_places))
    }
}

impl From<Precision> for PrecisionSpec {
    fn from(precision: Precision) -> Self {
        Self::Global(precision)
    }
}

impl From<BTreeMap<String, Precision>> for PrecisionSpec {
    fn from(map: BTreeMap<String, Precision>) -> Self {
        Self::PerVariable(map)
    }
}

impl TryFrom<&Value> for PrecisionSpec {
    type Error = PrecisionError;

    fn try_from(value: &Value) -> PrecisionResult<Self> {
        Self::from_json(value)
    }
}

/// Variable names that must never be rounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList(BTreeSet<String>);

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ExclusionList {
    fn from(name: &str) -> Self {
        std::iter::once(name).collect()
    }
}

impl From<String> for ExclusionList {
    fn from(name: String) -> Self {
        std::iter::once(name).collect()
    }
}

impl<S: Into<String>> From<Vec<S>> for ExclusionList {
    fn from(names: Vec<S>) -> Self {
        names.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_parts_exclusive() {
        assert_eq!(
            Precision::from_parts(Some(3), None),
            Ok(Precision::SignificantDigits(3))
        );
        assert_eq!(
            Precision::from_parts(None, Some(-1)),
            Ok(Precision::DecimalPlaces(-1))
        );
        assert!(matches!(
            Precision::from_parts(Some(3), Some(2)),
            Err(PrecisionError::InvalidPrecisionSpec(_))
        ));
        assert!(matches!(
            Precision::from_parts(None, None),
            Err(PrecisionError::InvalidPrecisionSpec(_))
        ));
    }

    #[test]
    fn test_zero_is_a_legal_parameter() {
        assert_eq!(
            Precision::from_parts(Some(0), None),
            Ok(Precision::SignificantDigits(0))
        );
        assert_eq!(
            Precision::from_parts(None, Some(0)),
            Ok(Precision::DecimalPlaces(0))
        );
    }

    #[test]
    fn test_spec_from_json_integer() {
        let spec = PrecisionSpec::from_json(&json!(2)).unwrap();
        assert_eq!(spec, PrecisionSpec::Global(Precision::DecimalPlaces(2)));
    }

    #[test]
    fn test_spec_from_json_mapping() {
        let spec = PrecisionSpec::from_json(&json!({
            "UVEL": 2,
            "WVEL": {"nsd": 3},
            "VVEL": {"dsd": -1}
        }))
        .unwrap();

        let expected = PrecisionSpec::per_variable([
            ("UVEL", Precision::DecimalPlaces(2)),
            ("WVEL", Precision::SignificantDigits(3)),
            ("VVEL", Precision::DecimalPlaces(-1)),
        ]);
        assert_eq!(spec, expected);
    }

    #[test]
    fn test_spec_from_json_rejects_other_types() {
        for value in [json!(2.5), json!("2"), json!(true), json!([1, 2]), json!(null)] {
            assert!(
                matches!(
                    PrecisionSpec::from_json(&value),
                    Err(PrecisionError::InvalidPrecisionType(_))
                ),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_spec_from_json_rejects_bad_entries() {
        let err = PrecisionSpec::from_json(&json!({"UVEL": "two"})).unwrap_err();
        assert!(matches!(err, PrecisionError::InvalidPrecisionType(ref m) if m.starts_with("UVEL")));

        let err = PrecisionSpec::from_json(&json!({"UVEL": {"nsd": -2}})).unwrap_err();
        assert!(matches!(err, PrecisionError::InvalidPrecisionType(_)));

        let err = PrecisionSpec::from_json(&json!({"UVEL": {"nsd": 2, "dsd": 1}})).unwrap_err();
        assert!(matches!(err, PrecisionError::InvalidPrecisionSpec(_)));

        let err = PrecisionSpec::from_json(&json!({"UVEL": {"digits": 2}})).unwrap_err();
        assert!(matches!(err, PrecisionError::InvalidPrecisionType(_)));
    }

    #[test]
    fn test_spec_from_json_rejects_out_of_range() {
        let err = PrecisionSpec::from_json(&json!(4_000_000_000i64)).unwrap_err();
        assert!(matches!(err, PrecisionError::InvalidPrecisionType(_)));
    }

    #[test]
    fn test_exclusion_list_from_single_name() {
        let list = ExclusionList::from("WVEL");
        assert!(list.contains("WVEL"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_exclusion_list_deserializes_from_sequence() {
        let list: ExclusionList = serde_json::from_value(json!(["B", "A", "B"])).unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_precision_display() {
        assert_eq!(Precision::DecimalPlaces(2).to_string(), "dsd=2");
        assert_eq!(Precision::SignificantDigits(4).to_string(), "nsd=4");
    }
}
