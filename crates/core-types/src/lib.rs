// In crates/core-types/src/lib.rs

pub mod analysis;
pub mod collection;
pub mod error;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use analysis::{
    AnalysisSnapshot, AssetTrend, BollingerReading, ConfirmationTally, DashboardSnapshot,
    DashboardStats, IndicatorAction, IndicatorReadings, MovingAverageReading, SignalCounts,
    StochasticReading, ValueReading,
};
pub use collection::{
    ChannelState, CollectionMethod, CollectionOverview, CollectionStatus, LatestPrices, PriceQuote,
};
pub use error::{Error, Result};
pub use types::{
    Asset, IndicatorVote, Signal, SignalOutcome, SignalStatus, SignalType, Timeframe, Trend,
    TrendDirection, MAX_CONFIRMATIONS,
};
