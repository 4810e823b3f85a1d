// In crates/core-types/src/collection.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Asset, Error, Result};

/// A price-collection channel on the data-collection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMethod {
    Websocket,
    Apis,
    Simulator,
}

impl CollectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionMethod::Websocket => "websocket",
            CollectionMethod::Apis => "apis",
            CollectionMethod::Simulator => "simulator",
        }
    }
}

impl fmt::Display for CollectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "websocket" => Ok(CollectionMethod::Websocket),
            "apis" => Ok(CollectionMethod::Apis),
            "simulator" => Ok(CollectionMethod::Simulator),
            other => Err(Error::UnknownCollectionMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelState {
    pub active: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Per-channel state reported by `GET /data-collection/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub websocket: ChannelState,
    pub apis: ChannelState,
    pub simulator: ChannelState,
}

impl CollectionStatus {
    pub fn channel(&self, method: CollectionMethod) -> &ChannelState {
        match method {
            CollectionMethod::Websocket => &self.websocket,
            CollectionMethod::Apis => &self.apis,
            CollectionMethod::Simulator => &self.simulator,
        }
    }

    pub fn channel_mut(&mut self, method: CollectionMethod) -> &mut ChannelState {
        match method {
            CollectionMethod::Websocket => &mut self.websocket,
            CollectionMethod::Apis => &mut self.apis,
            CollectionMethod::Simulator => &mut self.simulator,
        }
    }
}

impl Default for CollectionStatus {
    /// Only the simulator runs until something else is started.
    fn default() -> Self {
        Self {
            websocket: ChannelState::default(),
            apis: ChannelState::default(),
            simulator: ChannelState { active: true, ..ChannelState::default() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub asset: Asset,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Latest prices grouped by the channel that produced them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LatestPrices {
    #[serde(default)]
    pub websocket: Vec<PriceQuote>,
    #[serde(default)]
    pub apis: Vec<PriceQuote>,
    #[serde(default)]
    pub simulated: Vec<PriceQuote>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionOverview {
    pub status: CollectionStatus,
    pub prices: LatestPrices,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_has_only_simulator_running() {
        let status = CollectionStatus::default();
        assert!(status.channel(CollectionMethod::Simulator).active);
        assert!(!status.channel(CollectionMethod::Websocket).active);
        assert!(!status.channel(CollectionMethod::Apis).active);
    }

    #[test]
    fn status_decodes_backend_payload() {
        let json = r#"{
            "websocket": {"active": false, "last_update": null, "error": "connection refused"},
            "apis": {"active": true, "last_update": "2025-06-03T10:30:00Z", "error": null},
            "simulator": {"active": true, "last_update": null, "error": null}
        }"#;
        let status: CollectionStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.websocket.error.as_deref(), Some("connection refused"));
        assert!(status.apis.last_update.is_some());
    }
}
