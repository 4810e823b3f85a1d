// In crates/signals/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Generator profile `{profile}` has nothing to choose for {field}")]
    EmptyChoice { profile: &'static str, field: &'static str },

    #[error("Generator profile `{profile}` has an invalid {field} range {start}..{end}")]
    InvalidRange {
        profile: &'static str,
        field: &'static str,
        start: u32,
        end: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
