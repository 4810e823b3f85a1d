// In crates/api-client/src/types.rs

use core_types::{Asset, CollectionMethod};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const STATUS_SUCCESS: &str = "success";

/// The response wrapper every backend endpoint uses:
/// `{ "status": "success" | ..., "data": ..., "message": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Unwraps the payload. Only `status == "success"` counts as success.
    pub fn into_data(self) -> Result<T> {
        if !self.is_success() {
            return Err(Error::Rejected {
                status: self.status,
                message: self.message.unwrap_or_default(),
            });
        }
        self.data.ok_or(Error::MissingData)
    }

    /// Unwraps the message of a command-style response that carries no data.
    pub fn into_message(self) -> Result<String> {
        if !self.is_success() {
            return Err(Error::Rejected {
                status: self.status,
                message: self.message.unwrap_or_default(),
            });
        }
        Ok(self.message.unwrap_or_default())
    }
}

// --- Request bodies ---

#[derive(Debug, Clone, Serialize)]
pub struct SelectPairRequest {
    pub pair: Asset,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionCommand {
    pub method: CollectionMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeSimulationRequest {
    pub asset: Asset,
}

// --- Responses with a known shape ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSelection {
    pub selected_pair: Asset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub current_pair: Option<Asset>,
    #[serde(default)]
    pub available_pairs: Vec<Asset>,
    #[serde(default)]
    pub version: Option<String>,
}
