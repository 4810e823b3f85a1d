// In crates/core-types/src/analysis.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Asset, Timeframe, Trend, TrendDirection, MAX_CONFIRMATIONS};

/// The action an indicator reading suggests on the technical-analysis page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueReading {
    pub value: f64,
    pub trend: Trend,
    pub signal: IndicatorAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageReading {
    pub fast: f64,
    pub slow: f64,
    pub trend: Trend,
    pub signal: IndicatorAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
    pub trend: Trend,
    pub signal: IndicatorAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
    pub trend: Trend,
    pub signal: IndicatorAction,
}

/// One reading per indicator shown on the technical-analysis page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReadings {
    pub rsi: ValueReading,
    pub macd: ValueReading,
    pub ma: MovingAverageReading,
    pub bb: BollingerReading,
    pub stoch: StochasticReading,
}

/// Split of the confirmation checks into bullish and bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationTally {
    pub bullish: u32,
    pub bearish: u32,
    pub total: u32,
    pub confidence: u32,
}

impl ConfirmationTally {
    /// Builds the tally from the bullish count; the rest of the checks are bearish.
    ///
    /// Counts above [`MAX_CONFIRMATIONS`] are clamped.
    pub fn from_bullish(bullish: u32) -> Self {
        let bullish = bullish.min(MAX_CONFIRMATIONS);
        let confidence = (f64::from(bullish) / f64::from(MAX_CONFIRMATIONS) * 100.0).round() as u32;
        Self {
            bullish,
            bearish: MAX_CONFIRMATIONS - bullish,
            total: MAX_CONFIRMATIONS,
            confidence,
        }
    }
}

/// Everything the technical-analysis page renders for one asset/timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub asset: Asset,
    pub timeframe: Timeframe,
    pub indicators: IndicatorReadings,
    pub confirmations: ConfirmationTally,
    pub generated_at: DateTime<Utc>,
}

// --- Dashboard ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalCounts {
    pub active: u32,
    pub buy: u32,
    pub sell: u32,
    pub pending: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTrend {
    pub asset: Asset,
    pub trend: TrendDirection,
    pub confidence: f64,
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub success_rate: f64,
    pub total_signals: u64,
    pub today_signals: u32,
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub signals: SignalCounts,
    pub assets: Vec<AssetTrend>,
    pub stats: DashboardStats,
    pub generated_at: DateTime<Utc>,
}
