use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum BatchError {
    /// The city list could not be read; nothing was attempted.
    #[error("failed to list cities: {0}")]
    CityList(#[source] StoreError),

    #[error("invalid run scope: {0}")]
    InvalidScope(&'static str),
}

pub type BatchResult<T> = Result<T, BatchError>;
