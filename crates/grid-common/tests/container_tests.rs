//! Tests for ArrayContainer kind checks.

use grid_common::{ArrayContainer, ContainerKind, Dataset, GridError, NumericArray};

fn single() -> NumericArray {
    NumericArray::new("UVEL", ["y", "x"], vec![2, 2], vec![0.5f64, 1.5, 2.5, 3.5]).unwrap()
}

#[test]
fn test_single_unwraps_as_single() {
    let container = ArrayContainer::from(single());
    assert_eq!(container.kind(), ContainerKind::SingleArray);
    let array = container.into_single().unwrap();
    assert_eq!(array.name(), "UVEL");
}

#[test]
fn test_collection_rejected_as_single() {
    let ds = Dataset::new().with_data_var(single()).unwrap();
    let err = ArrayContainer::from(ds).into_single().unwrap_err();
    assert_eq!(
        err,
        GridError::WrongContainerKind {
            expected: ContainerKind::SingleArray,
            found: ContainerKind::Collection,
        }
    );
}

#[test]
fn test_single_rejected_as_collection() {
    let err = ArrayContainer::from(single()).into_collection().unwrap_err();
    assert!(matches!(
        err,
        GridError::WrongContainerKind {
            expected: ContainerKind::Collection,
            ..
        }
    ));
    assert_eq!(err.to_string(), "expected a collection, got a single array");
}
