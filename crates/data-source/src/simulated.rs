// In crates/data-source/src/simulated.rs

use app_config::{DataSourceSettings, SignalFeed};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{
    AnalysisSnapshot, Asset, AssetTrend, BollingerReading, CollectionMethod, CollectionOverview,
    CollectionStatus, ConfirmationTally, DashboardSnapshot, DashboardStats, IndicatorAction,
    IndicatorReadings, LatestPrices, MovingAverageReading, PriceQuote, Signal, SignalCounts,
    StochasticReading, Timeframe, Trend, TrendDirection, ValueReading,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use signals::{
    seeded_signals_list, seeded_signals_page, GeneratorProfile, MockSignalGenerator, SignalSequence,
};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::{DataSource, Result};

/// Total signal count the dashboard starts from.
const INITIAL_TOTAL_SIGNALS: u64 = 248;

/// Assets and timeframes shown in the dashboard's trend table.
const TRENDED_ASSETS: [(Asset, Timeframe); 4] = [
    (Asset::EurUsd, Timeframe::M15),
    (Asset::GbpUsd, Timeframe::H1),
    (Asset::BtcUsd, Timeframe::M5),
    (Asset::Gold, Timeframe::M30),
];

/// Assets the simulated collectors report prices for.
const QUOTED_ASSETS: [Asset; 3] = [Asset::EurUsd, Asset::GbpUsd, Asset::BtcUsd];

/// Reference price and relative volatility per asset.
fn reference_quote(asset: Asset) -> (f64, f64) {
    match asset {
        Asset::EurUsd => (1.0850, 0.0008),
        Asset::GbpUsd => (1.2650, 0.0012),
        Asset::UsdJpy => (149.50, 0.0010),
        Asset::AudUsd => (0.6550, 0.0010),
        Asset::UsdCad => (1.3600, 0.0010),
        Asset::NzdUsd => (0.6100, 0.0010),
        Asset::UsdChf => (0.8800, 0.0010),
        Asset::EurGbp => (0.8580, 0.0010),
        Asset::EurJpy => (162.20, 0.0010),
        Asset::GbpJpy => (189.10, 0.0012),
        Asset::BtcUsd => (45000.0, 0.0200),
        Asset::EthUsd => (2500.0, 0.0250),
        Asset::Gold => (2000.0, 0.0050),
        Asset::Silver => (24.0, 0.0060),
    }
}

const STABILITY_SESSION_LIMIT: u32 = 20;

struct SimulationState {
    rng: StdRng,
    total_signals: u64,
    collection: CollectionStatus,
}

/// Synthesizes every page locally after an artificial delay.
pub struct SimulatedSource {
    latency: Duration,
    feed: SignalFeed,
    generator: MockSignalGenerator,
    state: Mutex<SimulationState>,
}

impl SimulatedSource {
    pub fn new(settings: &DataSourceSettings, feed: SignalFeed) -> Result<Self> {
        let profile = match feed {
            SignalFeed::List => GeneratorProfile::signals_list(),
            SignalFeed::Page => GeneratorProfile::signals_page(),
        };
        let last_seeded = seed_for(feed, Utc::now()).iter().map(|s| s.id).max().unwrap_or(0);
        let sequence = SignalSequence::starting_after(last_seeded);

        let (rng, generator) = match settings.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                MockSignalGenerator::with_seed(profile, sequence, seed.wrapping_add(1))?,
            ),
            None => (StdRng::from_entropy(), MockSignalGenerator::new(profile, sequence)?),
        };

        Ok(Self {
            latency: settings.simulated_latency(),
            feed,
            generator,
            state: Mutex::new(SimulationState {
                rng,
                total_signals: INITIAL_TOTAL_SIGNALS,
                collection: CollectionStatus::default(),
            }),
        })
    }

    /// Waits out the configured artificial latency.
    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_channel(&self, method: CollectionMethod, active: bool) -> CollectionStatus {
        let mut state = self.lock();
        let channel = state.collection.channel_mut(method);
        channel.active = active;
        channel.error = None;
        channel.last_update = Some(Utc::now());
        state.collection.clone()
    }
}

fn seed_for(feed: SignalFeed, now: DateTime<Utc>) -> Vec<Signal> {
    match feed {
        SignalFeed::List => seeded_signals_list(now),
        SignalFeed::Page => seeded_signals_page(now),
    }
}

/// `base` moved by up to `spread` in either direction.
fn jitter(rng: &mut StdRng, base: f64, spread: f64) -> f64 {
    base + rng.gen_range(-spread..spread)
}

fn pick<T>(rng: &mut StdRng, probability: f64, yes: T, no: T) -> T {
    if rng.gen_bool(probability) { yes } else { no }
}

fn quote(rng: &mut StdRng, asset: Asset, source: &str, now: DateTime<Utc>) -> PriceQuote {
    let (reference, volatility) = reference_quote(asset);
    PriceQuote {
        asset,
        price: reference * (1.0 + rng.gen_range(-volatility..volatility)),
        timestamp: now,
        source: Some(source.to_string()),
    }
}

fn simulated_readings(rng: &mut StdRng) -> IndicatorReadings {
    IndicatorReadings {
        rsi: ValueReading {
            value: jitter(rng, 58.42, 5.0),
            trend: pick(rng, 0.5, Trend::Bullish, Trend::Neutral),
            signal: pick(rng, 0.5, IndicatorAction::Buy, IndicatorAction::Hold),
        },
        macd: ValueReading {
            value: jitter(rng, 0.0023, 0.005),
            trend: pick(rng, 0.7, Trend::Bullish, Trend::Bearish),
            signal: pick(rng, 0.7, IndicatorAction::Buy, IndicatorAction::Sell),
        },
        ma: MovingAverageReading {
            fast: jitter(rng, 1.1234, 0.005),
            slow: jitter(rng, 1.1220, 0.005),
            trend: pick(rng, 0.6, Trend::Bullish, Trend::Bearish),
            signal: pick(rng, 0.6, IndicatorAction::Buy, IndicatorAction::Sell),
        },
        bb: BollingerReading {
            upper: jitter(rng, 1.1280, 0.005),
            middle: jitter(rng, 1.1240, 0.005),
            lower: jitter(rng, 1.1200, 0.005),
            width: jitter(rng, 0.0080, 0.001),
            trend: pick(rng, 0.5, Trend::Neutral, Trend::Bullish),
            signal: pick(rng, 0.5, IndicatorAction::Hold, IndicatorAction::Buy),
        },
        stoch: StochasticReading {
            k: jitter(rng, 75.32, 5.0),
            d: jitter(rng, 68.45, 5.0),
            trend: pick(rng, 0.6, Trend::Bullish, Trend::Bearish),
            signal: pick(rng, 0.6, IndicatorAction::Buy, IndicatorAction::Sell),
        },
    }
}

#[async_trait]
impl DataSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "SimulatedSource"
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }

    async fn initial_signals(&self) -> Result<Vec<Signal>> {
        Ok(seed_for(self.feed, Utc::now()))
    }

    async fn dashboard(&self) -> Result<DashboardSnapshot> {
        self.delay().await;
        let mut guard = self.lock();
        let state = &mut *guard;
        let rng = &mut state.rng;

        let signals = SignalCounts {
            active: rng.gen_range(8..18),
            buy: rng.gen_range(5..13),
            sell: rng.gen_range(2..8),
            pending: rng.gen_range(0..5),
        };
        let assets = TRENDED_ASSETS
            .iter()
            .map(|&(asset, timeframe)| AssetTrend {
                asset,
                trend: pick(rng, 0.5, TrendDirection::Up, TrendDirection::Down),
                confidence: f64::from(rng.gen_range(70u32..90)),
                timeframe,
            })
            .collect();

        state.total_signals += rng.gen_range(0..10);
        let stats = DashboardStats {
            success_rate: f64::from(rng.gen_range(70u32..80)),
            total_signals: state.total_signals,
            today_signals: rng.gen_range(20..30),
            avg_confidence: f64::from(rng.gen_range(75u32..85)),
        };

        Ok(DashboardSnapshot {
            signals,
            assets,
            stats,
            generated_at: Utc::now(),
        })
    }

    async fn analysis(&self, asset: Asset, timeframe: Timeframe) -> Result<AnalysisSnapshot> {
        self.delay().await;
        let mut state = self.lock();
        let indicators = simulated_readings(&mut state.rng);
        let bullish = state.rng.gen_range(30..50);

        tracing::debug!(%asset, %timeframe, bullish, "Simulated analysis.");
        Ok(AnalysisSnapshot {
            asset,
            timeframe,
            indicators,
            confirmations: ConfirmationTally::from_bullish(bullish),
            generated_at: Utc::now(),
        })
    }

    async fn indicators(&self) -> Result<Value> {
        self.delay().await;
        let readings = simulated_readings(&mut self.lock().rng);
        Ok(json!({ "indicators": serde_json::to_value(readings)? }))
    }

    async fn stability_report(&self) -> Result<Value> {
        self.delay().await;
        let mut state = self.lock();
        let rng = &mut state.rng;
        let confidence_stability = jitter(rng, 80.0, 10.0);
        let trend_consistency = jitter(rng, 75.0, 12.0);
        let overall = (confidence_stability + trend_consistency) / 2.0;
        let session_signals = rng.gen_range(0..STABILITY_SESSION_LIMIT);

        let mut recommendations = Vec::new();
        if overall < 80.0 {
            recommendations.push("Raise the minimum confidence until readings settle.");
        }
        if session_signals * 4 >= STABILITY_SESSION_LIMIT * 3 {
            recommendations.push("Session signal limit is close; expect fewer new signals.");
        }

        Ok(json!({
            "stability_report": {
                "status": if overall >= 80.0 { "stable" } else { "unstable" },
                "overall_stability": overall,
                "stability_metrics": {
                    "confidence_stability": confidence_stability,
                    "trend_consistency": trend_consistency,
                },
                "recommendations": recommendations,
            },
            "system_status": {
                "stability_score": overall,
                "session_signals": session_signals,
                "max_session_signals": STABILITY_SESSION_LIMIT,
            },
        }))
    }

    async fn performance(&self) -> Result<Value> {
        self.delay().await;
        let mut state = self.lock();
        let total_signals = state.total_signals;
        let rng = &mut state.rng;
        Ok(json!({
            "total_signals": total_signals,
            "success_rate": f64::from(rng.gen_range(70u32..80)),
            "average_confidence": f64::from(rng.gen_range(75u32..85)),
            "signals_per_day": rng.gen_range(20u32..30),
        }))
    }

    async fn next_signal(&self) -> Result<Signal> {
        self.delay().await;
        Ok(self.generator.generate())
    }

    async fn collection_overview(&self) -> Result<CollectionOverview> {
        self.delay().await;
        let now = Utc::now();
        let mut guard = self.lock();
        let state = &mut *guard;

        let mut prices = LatestPrices::default();
        for method in [CollectionMethod::Websocket, CollectionMethod::Apis, CollectionMethod::Simulator] {
            let channel = state.collection.channel_mut(method);
            if !channel.active {
                continue;
            }
            channel.last_update = Some(now);
            let quotes = QUOTED_ASSETS
                .iter()
                .map(|&asset| quote(&mut state.rng, asset, method.as_str(), now))
                .collect();
            match method {
                CollectionMethod::Websocket => prices.websocket = quotes,
                CollectionMethod::Apis => prices.apis = quotes,
                CollectionMethod::Simulator => prices.simulated = quotes,
            }
        }

        Ok(CollectionOverview {
            status: state.collection.clone(),
            prices,
        })
    }

    async fn start_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        self.delay().await;
        tracing::info!(%method, "Simulated collection channel started.");
        Ok(self.set_channel(method, true))
    }

    async fn stop_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        self.delay().await;
        tracing::info!(%method, "Simulated collection channel stopped.");
        Ok(self.set_channel(method, false))
    }

    async fn compare_prices(&self, asset: Asset) -> Result<Value> {
        self.delay().await;
        let now = Utc::now();
        let mut state = self.lock();
        let simulated = quote(&mut state.rng, asset, "simulator", now).price;
        let real = quote(&mut state.rng, asset, "apis", now).price;

        Ok(json!({
            "asset": asset,
            "real_price": real,
            "simulated_price": simulated,
            "spread": (real - simulated).abs(),
            "timestamp": now,
        }))
    }

    async fn optimize_simulation(&self, asset: Asset) -> Result<String> {
        self.delay().await;
        Ok(format!("Simulation parameters optimized for {}", asset))
    }
}
