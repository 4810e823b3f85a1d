// In crates/preferences/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown setting: {0}")]
    UnknownField(String),

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Settings must serialize to a JSON object")]
    NotAnObject,

    #[error("No confirmation at index {0}")]
    NoSuchConfirmation(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
