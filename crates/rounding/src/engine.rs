//! Rounding engine: reduce the precision of numeric buffers.
//!
//! Two semantics are supported:
//!
//! | Mode | Parameter | Error bound |
//! |------|-----------|-------------|
//! | Fixed decimal places | `dsd` | same *absolute* error for every element |
//! | Significant figures | `nsd` | same *relative* error for every element |
//!
//! Both round half to even. Every function returns a new array; inputs are
//! never modified. NaN and infinities pass through unchanged, as does zero in
//! significant-figure mode.

use grid_common::NumericArray;

use crate::error::PrecisionResult;
use crate::spec::Precision;

/// Scaled magnitudes at or above 2^50 are left alone: their float spacing is
/// already coarser than the requested precision, and rescaling them would
/// only add representation error.
const EXACT_LIMIT: f64 = (1u64 << 50) as f64;

/// Past this many digits in either direction every finite f64 either rounds
/// to zero or is returned unchanged.
const MAX_DECIMALS: i32 = 400;

/// Round `x` to `decimals` digits after the decimal point.
///
/// Negative `decimals` round to a power of ten left of the decimal point
/// (`-2` rounds to the nearest hundred).
pub fn round_to_decimals(x: f64, decimals: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }

    let decimals = decimals.clamp(-MAX_DECIMALS, MAX_DECIMALS);
    if decimals >= 0 {
        let factor = 10f64.powi(decimals);
        let scaled = x * factor;
        // no digits below 10^-decimals survive at this magnitude
        if !(scaled.abs() < EXACT_LIMIT) {
            return x;
        }
        scaled.round_ties_even() / factor
    } else {
        let factor = 10f64.powi(-decimals);
        if !factor.is_finite() {
            return 0.0f64.copysign(x);
        }
        let scaled = x / factor;
        if !(scaled.abs() < EXACT_LIMIT) {
            return x;
        }
        scaled.round_ties_even() * factor
    }
}

/// Round `x` to `sig_figs` significant digits.
///
/// The value is normalized by the smallest power of ten at or above its
/// magnitude, rounded to `sig_figs` decimals, then scaled back. With
/// `sig_figs == 0` the result is either zero or that power of ten.
pub fn round_to_significant(x: f64, sig_figs: u32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }

    let exponent = x.abs().log10().ceil() as i32;
    let decimals = i32::try_from(sig_figs).unwrap_or(i32::MAX);

    // 10^309 and 10^-324 are not representable; scale in two steps near the ends.
    if exponent.abs() > 300 {
        let half = exponent / 2;
        let s1 = 10f64.powi(half);
        let s2 = 10f64.powi(exponent - half);
        return round_to_decimals(x / s1 / s2, decimals) * s1 * s2;
    }

    let scale = 10f64.powi(exponent);
    round_to_decimals(x / scale, decimals) * scale
}

/// Round every element of `array` to `decimal_places` digits.
pub fn round_fixed_decimal(array: &NumericArray, decimal_places: i32) -> NumericArray {
    array.map_values(|x| round_to_decimals(x, decimal_places))
}

/// Round every element of `array` to `sig_figs` significant digits.
pub fn round_significant_figures(array: &NumericArray, sig_figs: u32) -> NumericArray {
    array.map_values(|x| round_to_significant(x, sig_figs))
}

/// Round `array` with an already validated precision.
pub fn round_with(array: &NumericArray, precision: Precision) -> NumericArray {
    match precision {
        Precision::DecimalPlaces(d) => round_fixed_decimal(array, d),
        Precision::SignificantDigits(n) => round_significant_figures(array, n),
    }
}

/// Round `array` using exactly one of `nsd` (significant digits) or `dsd`
/// (decimal places).
///
/// Fails with `InvalidPrecisionSpec` when both or neither are given.
pub fn round_array(
    array: &NumericArray,
    nsd: Option<u32>,
    dsd: Option<i32>,
) -> PrecisionResult<NumericArray> {
    let precision = Precision::from_parts(nsd, dsd)?;
    Ok(round_with(array, precision))
}

/// Round a variable, optionally dropping its attributes.
pub fn round_variable(array: &NumericArray, precision: Precision, keep_attrs: bool) -> NumericArray {
    let mut rounded = round_with(array, precision);
    if !keep_attrs {
        rounded.attributes.clear();
    }
    rounded
}
