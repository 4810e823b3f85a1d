// In crates/engine/src/analysis.rs

use chrono::{DateTime, Utc};
use core_types::{AnalysisSnapshot, Asset, Timeframe};
use data_source::DataSource;
use events::DashboardEvent;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::LoadStatus;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisState {
    pub asset: Asset,
    pub timeframe: Timeframe,
    pub snapshot: Option<AnalysisSnapshot>,
    /// Per-indicator detail as the backend reports it.
    pub indicators: Option<Value>,
    pub stability: Option<Value>,
    pub performance: Option<Value>,
    pub status: LoadStatus,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self {
            asset: Asset::EurUsd,
            timeframe: Timeframe::M15,
            snapshot: None,
            indicators: None,
            stability: None,
            performance: None,
            status: LoadStatus::Idle,
            last_refreshed: None,
        }
    }
}

/// Replaces `slot` on success; a failed fetch keeps what was there.
fn keep_or_replace(slot: &mut Option<Value>, fetched: data_source::Result<Value>, what: &'static str) {
    match fetched {
        Ok(value) => *slot = Some(value),
        Err(e) => tracing::warn!(what, error = %e, "Analysis detail refresh failed; keeping the previous one."),
    }
}

/// The technical-analysis page for one selected asset and timeframe.
#[derive(Clone)]
pub struct AnalysisView {
    source: Arc<dyn DataSource>,
    state: Arc<RwLock<AnalysisState>>,
    ws_tx: broadcast::Sender<DashboardEvent>,
}

impl AnalysisView {
    pub fn new(source: Arc<dyn DataSource>, ws_tx: broadcast::Sender<DashboardEvent>) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(AnalysisState::default())),
            ws_tx,
        }
    }

    pub async fn state(&self) -> AnalysisState {
        self.state.read().await.clone()
    }

    /// Changes the selection and fetches the analysis for it.
    pub async fn select(&self, asset: Asset, timeframe: Timeframe) {
        {
            let mut state = self.state.write().await;
            state.asset = asset;
            state.timeframe = timeframe;
        }
        self.refresh().await;
    }

    /// Fetches the analysis and its detail panels for the current selection.
    /// Anything that arrives after the selection moved on, success or
    /// failure, is dropped.
    pub async fn refresh(&self) {
        let (asset, timeframe) = {
            let mut state = self.state.write().await;
            state.status = LoadStatus::Loading;
            (state.asset, state.timeframe)
        };

        let (analysis, indicators, stability, performance) = tokio::join!(
            self.source.analysis(asset, timeframe),
            self.source.indicators(),
            self.source.stability_report(),
            self.source.performance(),
        );

        let snapshot = {
            let mut state = self.state.write().await;
            if (state.asset, state.timeframe) != (asset, timeframe) {
                tracing::debug!(%asset, %timeframe, "Dropping analysis for a stale selection.");
                return;
            }
            keep_or_replace(&mut state.indicators, indicators, "indicators");
            keep_or_replace(&mut state.stability, stability, "stability");
            keep_or_replace(&mut state.performance, performance, "performance");

            match analysis {
                Ok(snapshot) => {
                    state.snapshot = Some(snapshot.clone());
                    state.status = LoadStatus::Success;
                    state.last_refreshed = Some(Utc::now());
                    snapshot
                }
                Err(e) => {
                    tracing::warn!(%asset, %timeframe, error = %e, "Analysis refresh failed; keeping the previous result.");
                    state.status = LoadStatus::Error;
                    return;
                }
            }
        };

        tracing::debug!(%asset, %timeframe, confidence = snapshot.confirmations.confidence, "Analysis updated.");
        let _ = self.ws_tx.send(DashboardEvent::AnalysisUpdated(snapshot));
    }
}
