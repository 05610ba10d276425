//! Parse and validation errors for the value types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid big integer: {0:?}")]
    InvalidBig(String),

    #[error("invalid currency id: {0:?}")]
    InvalidCurrencyId(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("wrong byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
