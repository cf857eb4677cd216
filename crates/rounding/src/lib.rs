//! Precision reduction for gridded scientific arrays.
//!
//! Rounding floating point values to a controlled precision leaves long runs
//! of redundant trailing bits, which a lossless codec then squeezes out. This
//! crate decides *what* gets rounded and *how*:
//!
//! - [`engine`]: fixed decimal places or significant figures, per array.
//! - [`policy`]: resolve a global or per-variable [`PrecisionSpec`] against a
//!   [`grid_common::Dataset`], then apply it atomically.
//!
//! # Example
//!
//! ```
//! use grid_common::{Dataset, NumericArray};
//! use rounding::{CompressionPlan, CompressionPolicy, ExclusionList, PrecisionSpec};
//!
//! let mut ds = Dataset::new()
//!     .with_data_var(NumericArray::new("UVEL", ["x"], vec![2], vec![0.123f64, 4.567]).unwrap())
//!     .unwrap()
//!     .with_data_var(NumericArray::new("WVEL", ["x"], vec![2], vec![1e-6f64, 2e-6]).unwrap())
//!     .unwrap();
//!
//! let exclusions = ExclusionList::from("WVEL");
//! let plan = CompressionPlan::build(
//!     &ds,
//!     &PrecisionSpec::from(1),
//!     Some(&exclusions),
//!     &CompressionPolicy::default(),
//! )
//! .unwrap();
//! plan.apply(&mut ds).unwrap();
//!
//! assert_eq!(ds.data_var("UVEL").unwrap().data().to_f64_vec(), vec![0.1, 4.6]);
//! assert!(plan.encoding["WVEL"].lossless);
//! ```

pub mod engine;
pub mod error;
pub mod policy;
pub mod spec;

pub use engine::{
    round_array, round_fixed_decimal, round_significant_figures, round_to_decimals,
    round_to_significant, round_variable, round_with,
};
pub use error::{PrecisionError, PrecisionResult};
pub use policy::{
    apply_compression_plan, lossless_encoding, resolve_precision_map, CompressionPlan,
    CompressionPolicy, PrecisionMap,
};
pub use spec::{ExclusionList, Precision, PrecisionSpec};
