//! End-to-end compression: round, write, read back.

use compressor::{CompressError, Compressor, CompressorConfig};
use grid_common::{ArrayContainer, ContainerKind, EncodingMap, GridError, VariableEncoding};
use grid_store::{open_dataset, StoreConfig, StoreError, ZarrWriter};
use rounding::{ExclusionList, Precision, PrecisionError, PrecisionSpec};
use test_utils::{scratch_dir, temperature_array, velocity_dataset};

fn is_rounded_to(values: &[f64], decimals: i32) -> bool {
    let factor = 10f64.powi(decimals);
    values
        .iter()
        .all(|v| ((v * factor) - (v * factor).round()).abs() < 1e-6)
}

#[test]
fn test_compress_array_rejects_collection() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("out.zarr");

    let err = Compressor::new(CompressorConfig::default())
        .compress_array(velocity_dataset(4, 4), &out, 2)
        .unwrap_err();

    assert!(matches!(
        err,
        CompressError::Grid(GridError::WrongContainerKind {
            expected: ContainerKind::SingleArray,
            found: ContainerKind::Collection,
        })
    ));
    assert!(!out.exists());
}

#[test]
fn test_compress_collection_rejects_single_array() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("out.zarr");

    let err = Compressor::new(CompressorConfig::default())
        .compress_collection(
            ArrayContainer::from(temperature_array(4, 4)),
            &out,
            &PrecisionSpec::from(2),
            None,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        CompressError::Grid(GridError::WrongContainerKind { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn test_compress_array_rounds_and_writes() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("t2m.zarr");

    let report = Compressor::new(CompressorConfig::default())
        .compress_array(temperature_array(16, 8), &out, 1)
        .unwrap();

    assert_eq!(report.variables_written, 1);
    assert_eq!(report.variables_rounded, vec!["T2M"]);

    let ds = open_dataset(&out).unwrap();
    let t2m = ds.data_var("T2M").unwrap();
    assert_eq!(t2m.attributes.get("units"), Some(&serde_json::json!("K")));
    assert!(is_rounded_to(&t2m.data().to_f64_vec(), 1));
}

#[test]
fn test_exclusion_end_to_end() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("ocean.zarr");
    let original = velocity_dataset(12, 10);

    let exclusions = ExclusionList::from("WVEL");
    let report = Compressor::new(CompressorConfig::default())
        .compress_collection(original.clone(), &out, &PrecisionSpec::from(2), Some(&exclusions))
        .unwrap();

    assert_eq!(report.variables_rounded, vec!["THETA", "UVEL", "VVEL"]);
    assert_eq!(report.variables_written, 6);

    let restored = open_dataset(&out).unwrap();
    assert_eq!(restored.data_var("WVEL"), original.data_var("WVEL"));
    assert_eq!(restored.coord("x"), original.coord("x"));
    assert!(is_rounded_to(
        &restored.data_var("UVEL").unwrap().data().to_f64_vec(),
        2
    ));
    assert_ne!(restored.data_var("UVEL"), original.data_var("UVEL"));
}

#[test]
fn test_per_variable_significant_digits_keep_small_field() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("ocean.zarr");

    let spec = PrecisionSpec::from_json(&serde_json::json!({
        "UVEL": 2,
        "WVEL": { "nsd": 2 }
    }))
    .unwrap();
    Compressor::new(CompressorConfig::default())
        .compress_collection(velocity_dataset(8, 8), &out, &spec, None)
        .unwrap();

    let w = open_dataset(&out)
        .unwrap()
        .data_var("WVEL")
        .unwrap()
        .data()
        .to_f64_vec();
    assert!(w[8..].iter().any(|&v| v != 0.0));
    assert!(w[8..].iter().all(|&v| v.abs() < 3e-6));
}

#[test]
fn test_unknown_exclusion_fails_before_writing() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("ocean.zarr");

    let exclusions = ExclusionList::from(vec!["WVEL", "SALT"]);
    let err = Compressor::new(CompressorConfig::default())
        .compress_collection(velocity_dataset(4, 4), &out, &PrecisionSpec::from(2), Some(&exclusions))
        .unwrap_err();

    assert!(matches!(
        err,
        CompressError::Precision(PrecisionError::UnknownVariable(ref name)) if name == "SALT"
    ));
    assert!(!out.exists());
}

#[test]
fn test_existing_output_is_not_clobbered() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("taken");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("readme.txt"), "precious").unwrap();

    let err = Compressor::new(CompressorConfig::default())
        .compress_collection(velocity_dataset(4, 4), &out, &PrecisionSpec::from(2), None)
        .unwrap_err();

    assert!(matches!(err, CompressError::Store(StoreError::OutputExists(_))));
    assert_eq!(std::fs::read_to_string(out.join("readme.txt")).unwrap(), "precious");
}

#[test]
fn test_drop_attrs_on_rounded_variables() {
    let temp_dir = scratch_dir();
    let out = temp_dir.path().join("ocean.zarr");
    let config = CompressorConfig {
        keep_attrs: false,
        ..Default::default()
    };

    let spec = PrecisionSpec::per_variable([("UVEL", Precision::DecimalPlaces(1))]);
    Compressor::new(config)
        .compress_collection(velocity_dataset(4, 4), &out, &spec, None)
        .unwrap();

    let ds = open_dataset(&out).unwrap();
    assert!(ds.data_var("UVEL").unwrap().attributes.is_empty());
    assert!(!ds.data_var("VVEL").unwrap().attributes.is_empty());
}

#[test]
fn test_compress_file_shrinks_store() {
    let temp_dir = scratch_dir();
    let input = temp_dir.path().join("input.zarr");
    let out = temp_dir.path().join("rounded.zarr");
    let ds = velocity_dataset(64, 64);

    // input written losslessly but unrounded
    let encoding: EncodingMap = ds
        .variables()
        .map(|v| (v.name().to_string(), VariableEncoding::lossless()))
        .collect();
    let baseline = ZarrWriter::new(StoreConfig::default())
        .write(&ds, &encoding, &input)
        .unwrap();

    let report = Compressor::new(CompressorConfig::default())
        .compress_file(&input, &out, &PrecisionSpec::from(1), None)
        .unwrap();

    assert_eq!(report.raw_bytes, baseline.raw_bytes);
    assert!(
        report.bytes_on_disk < baseline.bytes_on_disk,
        "rounded {} >= unrounded {}",
        report.bytes_on_disk,
        baseline.bytes_on_disk
    );
    assert!(report.compression_ratio() > 1.0);

    let restored = open_dataset(&out).unwrap();
    assert!(is_rounded_to(
        &restored.data_var("VVEL").unwrap().data().to_f64_vec(),
        1
    ));
}

#[test]
fn test_compress_file_missing_input() {
    let temp_dir = scratch_dir();
    let err = Compressor::new(CompressorConfig::default())
        .compress_file(
            temp_dir.path().join("nope.zarr"),
            temp_dir.path().join("out.zarr"),
            &PrecisionSpec::from(2),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, CompressError::Store(StoreError::OpenFailed { .. })));
}
