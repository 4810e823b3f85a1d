// In crates/signals/src/filter.rs

use core_types::{Asset, Signal, SignalType, Timeframe};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ALL: &str = "all";

/// Either every value passes (`"all"`) or only one specific value does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL) {
            return Ok(Selection::All);
        }
        s.parse().map(Selection::Only)
    }
}

impl<T: fmt::Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The filter bar of the signals page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalCriteria {
    #[serde(default)]
    pub asset: Selection<Asset>,
    #[serde(default)]
    pub timeframe: Selection<Timeframe>,
    #[serde(default, rename = "type")]
    pub signal_type: Selection<SignalType>,
    #[serde(default, alias = "minConfidence")]
    pub min_confidence: f64,
}

impl SignalCriteria {
    /// A signal passes when every selection admits it and its confidence
    /// reaches the minimum.
    pub fn matches(&self, signal: &Signal) -> bool {
        self.asset.admits(&signal.asset)
            && self.timeframe.admits(&signal.timeframe)
            && self.signal_type.admits(&signal.signal_type)
            && signal.confidence >= self.min_confidence
    }

    /// True when no signal can be excluded by these criteria.
    pub fn is_unrestricted(&self) -> bool {
        self.asset == Selection::All
            && self.timeframe == Selection::All
            && self.signal_type == Selection::All
            && self.min_confidence <= 0.0
    }
}

/// Returns the signals that satisfy `criteria`, in their original order.
pub fn filter_signals(signals: &[Signal], criteria: &SignalCriteria) -> Vec<Signal> {
    signals
        .iter()
        .filter(|signal| criteria.matches(signal))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::SignalStatus;
    use std::collections::BTreeMap;

    fn signal(id: u64, asset: Asset, timeframe: Timeframe, signal_type: SignalType, confidence: f64) -> Signal {
        Signal {
            id,
            asset,
            timeframe,
            signal_type,
            confidence,
            confirmations: 40,
            timestamp: Utc::now(),
            status: SignalStatus::Active,
            indicators: BTreeMap::new(),
            result: None,
        }
    }

    fn mixed() -> Vec<Signal> {
        vec![
            signal(1, Asset::EurUsd, Timeframe::M15, SignalType::Buy, 85.0),
            signal(2, Asset::GbpUsd, Timeframe::H1, SignalType::Sell, 72.0),
            signal(3, Asset::BtcUsd, Timeframe::M5, SignalType::Buy, 65.0),
            signal(4, Asset::Gold, Timeframe::M30, SignalType::Sell, 78.0),
            signal(5, Asset::EurUsd, Timeframe::H1, SignalType::Buy, 92.0),
        ]
    }

    #[test]
    fn asset_and_confidence_example() {
        let signals = vec![
            signal(1, Asset::EurUsd, Timeframe::M15, SignalType::Buy, 85.0),
            signal(2, Asset::GbpUsd, Timeframe::M15, SignalType::Buy, 60.0),
        ];
        let criteria = SignalCriteria {
            asset: Selection::Only(Asset::EurUsd),
            min_confidence: 70.0,
            ..SignalCriteria::default()
        };

        let visible = filter_signals(&signals, &criteria);
        assert_eq!(visible, vec![signals[0].clone()]);
    }

    #[test]
    fn unrestricted_criteria_keep_everything() {
        let signals = mixed();
        let criteria = SignalCriteria::default();
        assert!(criteria.is_unrestricted());
        assert_eq!(filter_signals(&signals, &criteria), signals);
    }

    #[test]
    fn result_is_an_ordered_subsequence_and_exclusions_fail_a_predicate() {
        let signals = mixed();
        let criteria = SignalCriteria {
            timeframe: Selection::Only(Timeframe::H1),
            signal_type: Selection::All,
            min_confidence: 70.0,
            ..SignalCriteria::default()
        };

        let visible = filter_signals(&signals, &criteria);
        let ids: Vec<u64> = visible.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 5]);

        for s in &signals {
            assert_eq!(criteria.matches(s), ids.contains(&s.id));
        }
    }

    #[test]
    fn type_filter_and_boundary_confidence() {
        let signals = mixed();
        let criteria = SignalCriteria {
            signal_type: Selection::Only(SignalType::Sell),
            min_confidence: 78.0,
            ..SignalCriteria::default()
        };
        let ids: Vec<u64> = filter_signals(&signals, &criteria).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn criteria_decode_from_query_style_json() {
        let criteria: SignalCriteria = serde_json::from_str(
            r#"{"asset": "EURUSD", "timeframe": "all", "type": "buy", "minConfidence": 70}"#,
        )
        .unwrap();
        assert_eq!(criteria.asset, Selection::Only(Asset::EurUsd));
        assert_eq!(criteria.timeframe, Selection::All);
        assert_eq!(criteria.signal_type, Selection::Only(SignalType::Buy));
        assert_eq!(criteria.min_confidence, 70.0);

        let back = serde_json::to_value(&criteria).unwrap();
        assert_eq!(back["timeframe"], "all");
        assert_eq!(back["type"], "buy");
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let parsed = serde_json::from_str::<SignalCriteria>(r#"{"asset": "DOGEUSD"}"#);
        assert!(parsed.is_err());
    }
}
