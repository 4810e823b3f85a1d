// In crates/data-source/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API client error: {0}")]
    ApiClientError(#[from] api_client::Error),

    #[error("Signal generator error: {0}")]
    GeneratorError(#[from] signals::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
