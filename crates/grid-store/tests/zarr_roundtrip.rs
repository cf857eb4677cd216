//! Write datasets to Zarr and read them back.

use grid_common::{ArrayData, Dataset, EncodingMap, NumericArray, VariableEncoding};
use grid_store::{open_dataset, LosslessCodec, StoreConfig, StoreError, ZarrReader, ZarrWriter};
use test_utils::{assert_all_approx_eq, create_grid_with_nans, scratch_dir, velocity_dataset};

fn all_lossless(ds: &Dataset) -> EncodingMap {
    ds.variables()
        .map(|v| (v.name().to_string(), VariableEncoding::lossless()))
        .collect()
}

#[test]
fn test_gzip_roundtrip_preserves_dataset() {
    let temp_dir = scratch_dir();
    let path = temp_dir.path().join("ocean.zarr");
    let ds = velocity_dataset(24, 16);

    ZarrWriter::new(StoreConfig::default())
        .write(&ds, &all_lossless(&ds), &path)
        .expect("write");

    let reader = ZarrReader::open(&path).expect("open");
    assert_eq!(reader.coord_names(), &["x".to_string(), "y".to_string()]);
    assert_eq!(reader.attributes().get("title"), ds.attributes.get("title"));

    let restored = reader.read_dataset().expect("read");
    assert_eq!(restored, ds);
}

#[test]
fn test_partial_chunks_nans_and_integers() {
    let temp_dir = scratch_dir();
    let path = temp_dir.path().join("mixed.zarr");

    let with_nans = NumericArray::new(
        "sst",
        ["y", "x"],
        vec![7, 10],
        create_grid_with_nans(10, 7, &[(0, 0), (9, 6), (4, 3)]),
    )
    .unwrap();
    let counts = NumericArray::new("count", ["y", "x"], vec![7, 10], (0..70i64).collect::<Vec<_>>())
        .unwrap()
        .with_attribute("long_name", "observation count");

    let mut ds = Dataset::new();
    ds.add_data_var(with_nans.clone()).unwrap();
    ds.add_data_var(counts.clone()).unwrap();

    let config = StoreConfig {
        codec: LosslessCodec::BloscLz4,
        chunk_size: 3,
        ..Default::default()
    };
    ZarrWriter::new(config)
        .write(&ds, &all_lossless(&ds), &path)
        .expect("write");

    let restored = open_dataset(&path).expect("read");
    let sst = restored.data_var("sst").unwrap();
    assert_eq!(sst.shape(), &[7, 10]);
    assert_all_approx_eq!(
        &sst.data().to_f64_vec(),
        &with_nans.data().to_f64_vec(),
        0.0
    );
    assert_eq!(restored.data_var("count"), Some(&counts));
    assert_eq!(
        restored.data_var("count").unwrap().data(),
        &ArrayData::Int64((0..70).collect())
    );
}

#[test]
fn test_variables_without_encoding_are_stored_raw() {
    let temp_dir = scratch_dir();
    let path = temp_dir.path().join("raw.zarr");
    let ds = velocity_dataset(8, 8);

    let mut encoding = EncodingMap::new();
    encoding.insert("UVEL".to_string(), VariableEncoding::lossless());

    ZarrWriter::new(StoreConfig::default())
        .write(&ds, &encoding, &path)
        .expect("write");

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path.join("UVEL/zarr.json")).unwrap())
            .unwrap();
    let codecs = meta["codecs"].to_string();
    assert!(codecs.contains("gzip"), "{}", codecs);

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path.join("VVEL/zarr.json")).unwrap())
            .unwrap();
    assert!(!meta["codecs"].to_string().contains("gzip"));

    assert_eq!(open_dataset(&path).unwrap(), ds);
}

#[test]
fn test_open_dataset_rejects_unknown_inputs() {
    let temp_dir = scratch_dir();
    let csv = temp_dir.path().join("table.csv");
    std::fs::write(&csv, "a,b\n1,2\n").unwrap();

    assert!(matches!(open_dataset(&csv), Err(StoreError::UnsupportedInput(_))));
    assert!(matches!(
        open_dataset(temp_dir.path().join("missing.zarr")),
        Err(StoreError::OpenFailed { .. })
    ));
}

#[cfg(not(feature = "netcdf"))]
#[test]
fn test_netcdf_needs_feature() {
    let temp_dir = scratch_dir();
    let nc = temp_dir.path().join("input.nc");
    std::fs::write(&nc, b"CDF\x01").unwrap();

    assert!(matches!(open_dataset(&nc), Err(StoreError::UnsupportedInput(_))));
}
