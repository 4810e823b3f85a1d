// In crates/signals/src/seed.rs

//! The hard-coded signal lists both signal pages open with, placed relative to `now`.

use chrono::{DateTime, Duration, Utc};
use core_types::{
    Asset, IndicatorVote, Signal, SignalOutcome, SignalStatus, SignalType, Timeframe,
};
use std::collections::BTreeMap;

use IndicatorVote::{Buy as B, Neutral as N, Sell as S};

fn votes(rsi: IndicatorVote, macd: IndicatorVote, ma: IndicatorVote, bb: IndicatorVote, stoch: IndicatorVote) -> BTreeMap<String, IndicatorVote> {
    [("rsi", rsi), ("macd", macd), ("ma", ma), ("bb", bb), ("stoch", stoch)]
        .into_iter()
        .map(|(name, vote)| (name.to_string(), vote))
        .collect()
}

struct SeedRow {
    id: u64,
    asset: Asset,
    timeframe: Timeframe,
    signal_type: SignalType,
    confidence: f64,
    confirmations: u32,
    minutes_ago: i64,
    status: SignalStatus,
    result: Option<SignalOutcome>,
}

/// Starts a row for a fresh, active signal; the builder methods fill in the rest.
fn row(id: u64, asset: Asset, timeframe: Timeframe, signal_type: SignalType) -> SeedRow {
    SeedRow {
        id,
        asset,
        timeframe,
        signal_type,
        confidence: 0.0,
        confirmations: 0,
        minutes_ago: 0,
        status: SignalStatus::Active,
        result: None,
    }
}

impl SeedRow {
    fn scored(self, confidence: f64, confirmations: u32) -> Self {
        Self { confidence, confirmations, ..self }
    }

    fn aged(self, minutes_ago: i64, status: SignalStatus) -> Self {
        Self { minutes_ago, status, ..self }
    }

    fn ended(self, result: SignalOutcome) -> Self {
        Self { result: Some(result), ..self }
    }

    fn into_signal(self, now: DateTime<Utc>, indicators: BTreeMap<String, IndicatorVote>) -> Signal {
        Signal {
            id: self.id,
            asset: self.asset,
            timeframe: self.timeframe,
            signal_type: self.signal_type,
            confidence: self.confidence,
            confirmations: self.confirmations,
            timestamp: now - Duration::minutes(self.minutes_ago),
            status: self.status,
            indicators,
            result: self.result,
        }
    }
}

/// The five signals of the full signals page, newest first.
pub fn seeded_signals_page(now: DateTime<Utc>) -> Vec<Signal> {
    use SignalStatus::*;
    use SignalType::{Buy, Sell};

    vec![
        row(1, Asset::EurUsd, Timeframe::M15, Buy).scored(85.0, 48).aged(5, Active).into_signal(now, votes(B, B, B, N, B)),
        row(2, Asset::GbpUsd, Timeframe::H1, Sell).scored(72.0, 39).aged(35, Active).into_signal(now, votes(S, S, S, N, N)),
        row(3, Asset::BtcUsd, Timeframe::M5, Buy).scored(65.0, 35).aged(120, Expired).into_signal(now, votes(B, N, B, B, N)),
        row(4, Asset::Gold, Timeframe::M30, Sell).scored(78.0, 42).aged(180, Completed).into_signal(now, votes(S, S, S, S, N)),
        row(5, Asset::EurUsd, Timeframe::H1, Buy).scored(92.0, 52).aged(240, Completed).into_signal(now, votes(B, B, B, B, B)),
    ]
}

/// The eight signals of the compact signals list, newest first. Completed
/// entries carry their outcome.
pub fn seeded_signals_list(now: DateTime<Utc>) -> Vec<Signal> {
    use SignalOutcome::{Loss, Win};
    use SignalStatus::*;
    use SignalType::{Buy, Sell};

    [
        row(1, Asset::EurUsd, Timeframe::M15, Buy).scored(87.0, 42).aged(15, Active),
        row(2, Asset::GbpUsd, Timeframe::H1, Sell).scored(82.0, 38).aged(45, Active),
        row(3, Asset::BtcUsd, Timeframe::M5, Buy).scored(91.0, 51).aged(120, Completed).ended(Win),
        row(4, Asset::Gold, Timeframe::M30, Buy).scored(76.0, 32).aged(180, Completed).ended(Loss),
        row(5, Asset::UsdJpy, Timeframe::M15, Sell).scored(84.0, 45).aged(240, Completed).ended(Win),
        row(6, Asset::EthUsd, Timeframe::M5, Buy).scored(79.0, 36).aged(300, Completed).ended(Win),
        row(7, Asset::Silver, Timeframe::H1, Sell).scored(72.0, 30).aged(360, Completed).ended(Loss),
        row(8, Asset::AudUsd, Timeframe::M30, Buy).scored(68.0, 33).aged(420, Completed).ended(Win),
    ]
    .into_iter()
    .map(|seed| seed.into_signal(now, BTreeMap::new()))
    .collect()
}
