// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    /// The envelope's `status` was anything other than `"success"`.
    #[error("API rejected the request: status {status}, message: {message}")]
    Rejected { status: String, message: String },
    #[error("API reported success but the response carried no data")]
    MissingData,
}

pub type Result<T> = std::result::Result<T, Error>;
