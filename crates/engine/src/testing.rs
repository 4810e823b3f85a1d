// In crates/engine/src/testing.rs

use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    AnalysisSnapshot, Asset, BollingerReading, CollectionMethod, CollectionOverview,
    CollectionStatus, ConfirmationTally, DashboardSnapshot, DashboardStats, IndicatorAction,
    IndicatorReadings, MovingAverageReading, Signal, SignalCounts, SignalStatus, SignalType,
    StochasticReading, Timeframe, Trend, ValueReading,
};
use data_source::{DataSource, Error, Result};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// An analysis request for one asset that takes a while and may fail.
#[derive(Clone, Copy)]
struct SlowAnalysis {
    asset: Asset,
    delay: Duration,
    fails: bool,
}

/// A deterministic source for view tests. Signals get ids 1, 2, 3, ... and
/// confidence `60 + 10 * (id % 4)`.
#[derive(Default)]
pub struct ScriptedSource {
    failing: AtomicBool,
    last_id: AtomicU64,
    initial: Vec<Signal>,
    initial_calls: AtomicU64,
    slow_analysis: Mutex<Option<SlowAnalysis>>,
    collection: Mutex<CollectionStatus>,
}

impl ScriptedSource {
    pub fn with_initial(initial: Vec<Signal>) -> Self {
        let last_id = initial.iter().map(|s| s.id).max().unwrap_or(0);
        Self {
            last_id: AtomicU64::new(last_id),
            initial,
            ..Self::default()
        }
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes analysis requests for `asset` wait `delay`, then fail if `fails`.
    pub fn slow_analysis(&self, asset: Asset, delay: Duration, fails: bool) {
        *self.slow_analysis.lock().unwrap() = Some(SlowAnalysis { asset, delay, fails });
    }

    /// How many times the initial list was requested.
    pub fn initial_calls(&self) -> u64 {
        self.initial_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        Ok(())
    }
}

fn rejected() -> Error {
    Error::ApiClientError(api_client::Error::Rejected {
        status: "error".to_string(),
        message: "scripted failure".to_string(),
    })
}

pub fn signal(id: u64, asset: Asset, confidence: f64) -> Signal {
    Signal {
        id,
        asset,
        timeframe: Timeframe::M15,
        signal_type: if id % 2 == 0 { SignalType::Sell } else { SignalType::Buy },
        confidence,
        confirmations: 40,
        timestamp: Utc::now(),
        status: SignalStatus::Active,
        indicators: BTreeMap::new(),
        result: None,
    }
}

fn reading(value: f64) -> ValueReading {
    ValueReading {
        value,
        trend: Trend::Neutral,
        signal: IndicatorAction::Hold,
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "ScriptedSource"
    }

    async fn health(&self) -> Result<()> {
        self.check()
    }

    async fn initial_signals(&self) -> Result<Vec<Signal>> {
        self.initial_calls.fetch_add(1, Ordering::SeqCst);
        // Lets a concurrent refresh run while this one is in flight.
        tokio::task::yield_now().await;
        self.check()?;
        Ok(self.initial.clone())
    }

    async fn dashboard(&self) -> Result<DashboardSnapshot> {
        self.check()?;
        Ok(DashboardSnapshot {
            signals: SignalCounts { active: 10, buy: 6, sell: 4, pending: 1 },
            assets: Vec::new(),
            stats: DashboardStats {
                success_rate: 75.0,
                total_signals: 250,
                today_signals: 22,
                avg_confidence: 80.0,
            },
            generated_at: Utc::now(),
        })
    }

    async fn analysis(&self, asset: Asset, timeframe: Timeframe) -> Result<AnalysisSnapshot> {
        let slow = *self.slow_analysis.lock().unwrap();
        if let Some(slow) = slow.filter(|slow| slow.asset == asset) {
            tokio::time::sleep(slow.delay).await;
            if slow.fails {
                return Err(rejected());
            }
        }
        self.check()?;
        Ok(AnalysisSnapshot {
            asset,
            timeframe,
            indicators: IndicatorReadings {
                rsi: reading(55.0),
                macd: reading(0.002),
                ma: MovingAverageReading { fast: 1.12, slow: 1.11, trend: Trend::Bullish, signal: IndicatorAction::Buy },
                bb: BollingerReading {
                    upper: 1.13,
                    middle: 1.12,
                    lower: 1.11,
                    width: 0.008,
                    trend: Trend::Neutral,
                    signal: IndicatorAction::Hold,
                },
                stoch: StochasticReading { k: 70.0, d: 65.0, trend: Trend::Bullish, signal: IndicatorAction::Buy },
            },
            confirmations: ConfirmationTally::from_bullish(45),
            generated_at: Utc::now(),
        })
    }

    async fn indicators(&self) -> Result<Value> {
        self.check()?;
        Ok(json!({ "indicators": { "rsi": { "value": 55.0 } } }))
    }

    async fn stability_report(&self) -> Result<Value> {
        self.check()?;
        Ok(json!({ "stability_report": { "status": "stable", "overall_stability": 85.0 } }))
    }

    async fn performance(&self) -> Result<Value> {
        self.check()?;
        Ok(json!({ "total_signals": 250, "success_rate": 75.0 }))
    }

    async fn next_signal(&self) -> Result<Signal> {
        self.check()?;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(signal(id, Asset::EurUsd, 60.0 + 10.0 * (id % 4) as f64))
    }

    async fn collection_overview(&self) -> Result<CollectionOverview> {
        self.check()?;
        let status = self.collection.lock().unwrap().clone();
        Ok(CollectionOverview { status, ..CollectionOverview::default() })
    }

    async fn start_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        self.check()?;
        let mut status = self.collection.lock().unwrap();
        status.channel_mut(method).active = true;
        Ok(status.clone())
    }

    async fn stop_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        self.check()?;
        let mut status = self.collection.lock().unwrap();
        status.channel_mut(method).active = false;
        Ok(status.clone())
    }

    async fn compare_prices(&self, asset: Asset) -> Result<Value> {
        self.check()?;
        Ok(json!({ "asset": asset, "spread": 0.0001 }))
    }

    async fn optimize_simulation(&self, asset: Asset) -> Result<String> {
        self.check()?;
        Ok(format!("optimized {}", asset))
    }
}
