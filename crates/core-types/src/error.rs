// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown asset symbol: {0}")]
    UnknownAsset(String),

    #[error("Unknown timeframe code: {0}")]
    UnknownTimeframe(String),

    #[error("Unknown signal type: {0}")]
    UnknownSignalType(String),

    #[error("Unknown collection method: {0}")]
    UnknownCollectionMethod(String),

    #[error("Confidence {0} is outside [0, 100]")]
    ConfidenceOutOfRange(f64),

    #[error("Confirmation count {0} exceeds the maximum of 60")]
    TooManyConfirmations(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
