//! Error type for compression jobs.

use grid_common::GridError;
use grid_store::StoreError;
use rounding::PrecisionError;
use thiserror::Error;

/// Everything that can go wrong between taking a dataset and writing it.
#[derive(Error, Debug)]
pub enum CompressError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Precision(#[from] PrecisionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CompressResult<T> = Result<T, CompressError>;
