// In crates/core-types/src/types.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// The fixed number of confirmation checks a signal is scored against.
pub const MAX_CONFIRMATIONS: u32 = 60;

/// An instrument symbol that signals can be issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    EurUsd,
    GbpUsd,
    UsdJpy,
    AudUsd,
    UsdCad,
    NzdUsd,
    UsdChf,
    EurGbp,
    EurJpy,
    GbpJpy,
    BtcUsd,
    EthUsd,
    Gold,
    Silver,
}

impl Asset {
    pub const ALL: [Asset; 14] = [
        Asset::EurUsd,
        Asset::GbpUsd,
        Asset::UsdJpy,
        Asset::AudUsd,
        Asset::UsdCad,
        Asset::NzdUsd,
        Asset::UsdChf,
        Asset::EurGbp,
        Asset::EurJpy,
        Asset::GbpJpy,
        Asset::BtcUsd,
        Asset::EthUsd,
        Asset::Gold,
        Asset::Silver,
    ];

    /// The wire symbol, e.g. `"EURUSD"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::EurUsd => "EURUSD",
            Asset::GbpUsd => "GBPUSD",
            Asset::UsdJpy => "USDJPY",
            Asset::AudUsd => "AUDUSD",
            Asset::UsdCad => "USDCAD",
            Asset::NzdUsd => "NZDUSD",
            Asset::UsdChf => "USDCHF",
            Asset::EurGbp => "EURGBP",
            Asset::EurJpy => "EURJPY",
            Asset::GbpJpy => "GBPJPY",
            Asset::BtcUsd => "BTCUSD",
            Asset::EthUsd => "ETHUSD",
            Asset::Gold => "GOLD",
            Asset::Silver => "SILVER",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Asset::ALL
            .iter()
            .copied()
            .find(|asset| asset.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownAsset(s.to_string()))
    }
}

/// A chart interval code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// The wall-clock length of one bar.
    pub fn as_duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::minutes(1),
            Timeframe::M5 => Duration::minutes(5),
            Timeframe::M15 => Duration::minutes(15),
            Timeframe::M30 => Duration::minutes(30),
            Timeframe::H1 => Duration::hours(1),
            Timeframe::H4 => Duration::hours(4),
            Timeframe::D1 => Duration::days(1),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| Error::UnknownTimeframe(s.to_string()))
    }
}

/// The direction a signal recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "buy",
            SignalType::Sell => "sell",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(SignalType::Buy),
            "sell" => Ok(SignalType::Sell),
            _ => Err(Error::UnknownSignalType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Active,
    Completed,
    Expired,
}

/// A single indicator's opinion on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorVote {
    Buy,
    Sell,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOutcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// A trading signal as shown on the signal pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Session-scoped sequence number, increasing in creation order.
    pub id: u64,
    pub asset: Asset,
    pub timeframe: Timeframe,
    #[serde(rename = "type", alias = "direction")]
    pub signal_type: SignalType,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    /// Number of passed confirmation checks, at most [`MAX_CONFIRMATIONS`].
    pub confirmations: u32,
    pub timestamp: DateTime<Utc>,
    pub status: SignalStatus,
    #[serde(default)]
    pub indicators: BTreeMap<String, IndicatorVote>,
    #[serde(default)]
    pub result: Option<SignalOutcome>,
}

impl Signal {
    /// Checks the confidence and confirmation bounds.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.confidence) {
            return Err(Error::ConfidenceOutOfRange(self.confidence));
        }
        if self.confirmations > MAX_CONFIRMATIONS {
            return Err(Error::TooManyConfirmations(self.confirmations));
        }
        Ok(())
    }

    /// Time elapsed since the signal was issued, as seen from `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    pub fn is_active(&self) -> bool {
        self.status == SignalStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Signal {
        Signal {
            id: 1,
            asset: Asset::EurUsd,
            timeframe: Timeframe::M15,
            signal_type: SignalType::Buy,
            confidence: 85.0,
            confirmations: 48,
            timestamp: Utc::now(),
            status: SignalStatus::Active,
            indicators: BTreeMap::from([("rsi".to_string(), IndicatorVote::Buy)]),
            result: None,
        }
    }

    #[test]
    fn asset_symbols_parse_back() {
        for asset in Asset::ALL {
            assert_eq!(asset.as_str().parse::<Asset>().unwrap(), asset);
        }
        assert_eq!("eurusd".parse::<Asset>().unwrap(), Asset::EurUsd);
        assert!("XAUUSD".parse::<Asset>().is_err());
    }

    #[test]
    fn timeframe_codes_match_serde_names() {
        for tf in Timeframe::ALL {
            let json = serde_json::to_string(&tf).unwrap();
            assert_eq!(json, format!("\"{}\"", tf.as_str()));
        }
        assert_eq!(Timeframe::H4.as_duration(), Duration::hours(4));
    }

    #[test]
    fn signal_serializes_type_field() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "buy");
        assert_eq!(value["asset"], "EURUSD");
        assert_eq!(value["timeframe"], "15m");
        assert_eq!(value["indicators"]["rsi"], "buy");
    }

    #[test]
    fn signal_accepts_direction_alias() {
        let json = r#"{
            "id": 7, "asset": "GOLD", "timeframe": "30m", "direction": "sell",
            "confidence": 76, "confirmations": 32,
            "timestamp": "2025-06-03T10:30:00Z", "status": "completed", "result": "loss"
        }"#;
        let signal: Signal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.signal_type, SignalType::Sell);
        assert_eq!(signal.result, Some(SignalOutcome::Loss));
        assert!(signal.indicators.is_empty());
    }

    #[test]
    fn validate_enforces_bounds() {
        let mut signal = sample();
        assert!(signal.validate().is_ok());

        signal.confirmations = MAX_CONFIRMATIONS + 1;
        assert!(matches!(signal.validate(), Err(Error::TooManyConfirmations(61))));

        signal.confirmations = MAX_CONFIRMATIONS;
        signal.confidence = 100.5;
        assert!(matches!(signal.validate(), Err(Error::ConfidenceOutOfRange(_))));
    }
}
