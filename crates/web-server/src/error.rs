// In crates/web-server/src/error.rs

use api_client::ApiEnvelope;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Settings(#[from] preferences::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to bind server address: {0}")]
    ServerBindError(std::io::Error),

    #[error("Server stopped with an error: {0}")]
    ServeError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) | Error::Settings(preferences::Error::NoSuchConfirmation(_)) => {
                StatusCode::NOT_FOUND
            }
            Error::Settings(preferences::Error::UnknownField(_))
            | Error::Settings(preferences::Error::InvalidValue { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures go out in the same envelope as successes, with `status: "error"`.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed.");
        } else {
            tracing::debug!(error = %self, "Request rejected.");
        }
        (status, Json(ApiEnvelope::<()>::error(self.to_string()))).into_response()
    }
}
