//! NetCDF input using the native netcdf library.
//!
//! Every variable is read as `f64`. `_FillValue` and `missing_value` become
//! NaN and `scale_factor`/`add_offset` are applied, so the attributes that
//! describe packing are dropped from the result. A one-dimensional variable
//! named after its own dimension is treated as a coordinate.

use std::path::Path;

use grid_common::{Attributes, Dataset, NumericArray};
use ::netcdf::AttributeValue;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

const PACKING_ATTRS: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Load every variable of the NetCDF file at `path`.
pub fn open_netcdf(path: impl AsRef<Path>) -> StoreResult<Dataset> {
    let path = path.as_ref();
    let file = ::netcdf::open(path).map_err(|e| StoreError::open_failed(path, e))?;

    let mut ds = Dataset::new();
    ds.attributes = collect_attributes(file.attributes());

    for var in file.variables() {
        let name = var.name();
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        if shape.is_empty() {
            warn!(variable = %name, "Skipping scalar NetCDF variable");
            continue;
        }

        let raw: Vec<f64> = var
            .get_values::<f64, _>(..)
            .map_err(|e| StoreError::read_failed(name.as_str(), e))?;

        let mut attributes = collect_attributes(var.attributes());
        let data = unpack(raw, &attributes);
        for key in PACKING_ATTRS {
            attributes.remove(key);
        }

        let mut array = NumericArray::new(name.as_str(), dims.clone(), shape, data)
            .map_err(|e| StoreError::read_failed(name.as_str(), e))?;
        array.attributes = attributes;

        let added = if dims.len() == 1 && dims[0] == name {
            ds.add_coord(array)
        } else {
            ds.add_data_var(array)
        };
        added.map_err(|e| StoreError::read_failed(name.as_str(), e))?;
        debug!(variable = %name, "Read NetCDF variable");
    }

    Ok(ds)
}

/// Mask fill values and apply CF scale/offset.
fn unpack(raw: Vec<f64>, attributes: &Attributes) -> Vec<f64> {
    let number = |key: &str| attributes.get(key).and_then(first_number);
    let fill = number("_FillValue");
    let missing = number("missing_value");
    let scale = number("scale_factor").unwrap_or(1.0);
    let offset = number("add_offset").unwrap_or(0.0);

    raw.into_iter()
        .map(|v| {
            if Some(v) == fill || Some(v) == missing {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect()
}

fn first_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Array(items) => items.first().and_then(|v| v.as_f64()),
        other => other.as_f64(),
    }
}

fn collect_attributes<'a>(attrs: impl Iterator<Item = ::netcdf::Attribute<'a>>) -> Attributes {
    let mut out = Attributes::new();
    for attr in attrs {
        match attr.value() {
            Ok(value) => {
                if let Some(json) = attribute_to_json(value) {
                    out.insert(attr.name().to_string(), json);
                }
            }
            Err(e) => warn!(attribute = attr.name(), error = %e, "Skipping unreadable attribute"),
        }
    }
    out
}

fn attribute_to_json(value: AttributeValue) -> Option<serde_json::Value> {
    use serde_json::json;

    let json = match value {
        AttributeValue::Str(s) => json!(s),
        AttributeValue::Strs(s) => json!(s),
        AttributeValue::Double(v) => json!(v),
        AttributeValue::Doubles(v) => json!(v),
        AttributeValue::Float(v) => json!(v),
        AttributeValue::Floats(v) => json!(v),
        AttributeValue::Int(v) => json!(v),
        AttributeValue::Ints(v) => json!(v),
        AttributeValue::Short(v) => json!(v),
        AttributeValue::Shorts(v) => json!(v),
        AttributeValue::Schar(v) => json!(v),
        AttributeValue::Schars(v) => json!(v),
        AttributeValue::Uchar(v) => json!(v),
        AttributeValue::Uchars(v) => json!(v),
        AttributeValue::Ushort(v) => json!(v),
        AttributeValue::Ushorts(v) => json!(v),
        AttributeValue::Uint(v) => json!(v),
        AttributeValue::Uints(v) => json!(v),
        AttributeValue::Longlong(v) => json!(v),
        AttributeValue::Longlongs(v) => json!(v),
        AttributeValue::Ulonglong(v) => json!(v),
        AttributeValue::Ulonglongs(v) => json!(v),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(json)
}
