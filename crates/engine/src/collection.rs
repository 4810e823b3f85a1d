// In crates/engine/src/collection.rs

use chrono::{DateTime, Utc};
use core_types::{Asset, CollectionMethod, CollectionOverview};
use data_source::DataSource;
use events::DashboardEvent;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::LoadStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionState {
    pub overview: CollectionOverview,
    /// Last price comparison requested on the page.
    pub comparison: Option<Value>,
    /// Message returned by the last simulator optimization.
    pub message: Option<String>,
    /// Why the last operation failed, cleared by the next success.
    pub error: Option<String>,
    pub status: LoadStatus,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// The data-collection page: channel status, latest prices and commands.
#[derive(Clone)]
pub struct CollectionView {
    source: Arc<dyn DataSource>,
    state: Arc<RwLock<CollectionState>>,
    ws_tx: broadcast::Sender<DashboardEvent>,
}

impl CollectionView {
    pub fn new(source: Arc<dyn DataSource>, ws_tx: broadcast::Sender<DashboardEvent>) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(CollectionState::default())),
            ws_tx,
        }
    }

    pub async fn state(&self) -> CollectionState {
        self.state.read().await.clone()
    }

    async fn record_error(&self, operation: &str, error: data_source::Error) {
        tracing::warn!(operation, error = %error, "Data collection operation failed.");
        let mut state = self.state.write().await;
        state.error = Some(error.to_string());
        state.status = LoadStatus::Error;
    }

    async fn publish(&self) {
        let overview = self.state.read().await.overview.clone();
        let _ = self.ws_tx.send(DashboardEvent::CollectionUpdated(overview));
    }

    pub async fn refresh(&self) {
        self.state.write().await.status = LoadStatus::Loading;
        match self.source.collection_overview().await {
            Ok(overview) => {
                {
                    let mut state = self.state.write().await;
                    state.overview = overview;
                    state.error = None;
                    state.status = LoadStatus::Success;
                    state.last_refreshed = Some(Utc::now());
                }
                self.publish().await;
            }
            Err(e) => self.record_error("refresh", e).await,
        }
    }

    pub async fn start(&self, method: CollectionMethod) {
        match self.source.start_collection(method).await {
            Ok(status) => self.apply_status(status).await,
            Err(e) => self.record_error("start", e).await,
        }
    }

    pub async fn stop(&self, method: CollectionMethod) {
        match self.source.stop_collection(method).await {
            Ok(status) => self.apply_status(status).await,
            Err(e) => self.record_error("stop", e).await,
        }
    }

    async fn apply_status(&self, status: core_types::CollectionStatus) {
        {
            let mut state = self.state.write().await;
            state.overview.status = status;
            state.error = None;
            state.status = LoadStatus::Success;
        }
        self.publish().await;
    }

    pub async fn compare(&self, asset: Asset) {
        match self.source.compare_prices(asset).await {
            Ok(comparison) => {
                let mut state = self.state.write().await;
                state.comparison = Some(comparison);
                state.error = None;
            }
            Err(e) => self.record_error("compare", e).await,
        }
    }

    pub async fn optimize(&self, asset: Asset) {
        match self.source.optimize_simulation(asset).await {
            Ok(message) => {
                tracing::info!(%asset, reply = %message, "Simulation optimized.");
                let mut state = self.state.write().await;
                state.message = Some(message);
                state.error = None;
            }
            Err(e) => self.record_error("optimize", e).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSource;

    #[tokio::test]
    async fn commands_update_status_and_publish() {
        let (ws_tx, mut ws_rx) = broadcast::channel(16);
        let view = CollectionView::new(Arc::new(ScriptedSource::default()), ws_tx);

        view.refresh().await;
        view.start(CollectionMethod::Apis).await;

        let state = view.state().await;
        assert!(state.overview.status.apis.active);
        assert!(state.error.is_none());
        assert!(matches!(ws_rx.try_recv(), Ok(DashboardEvent::CollectionUpdated(_))));
        assert!(matches!(ws_rx.try_recv(), Ok(DashboardEvent::CollectionUpdated(_))));

        view.stop(CollectionMethod::Apis).await;
        assert!(!view.state().await.overview.status.apis.active);
    }

    #[tokio::test]
    async fn failures_are_recorded_then_cleared() {
        let source = Arc::new(ScriptedSource::default());
        let (ws_tx, _ws_rx) = broadcast::channel(16);
        let view = CollectionView::new(source.clone(), ws_tx);

        source.fail(true);
        view.start(CollectionMethod::Websocket).await;
        let state = view.state().await;
        assert!(state.error.as_deref().unwrap_or_default().contains("scripted failure"));
        assert!(!state.overview.status.websocket.active);

        source.fail(false);
        view.compare(Asset::EurUsd).await;
        view.optimize(Asset::EurUsd).await;
        let state = view.state().await;
        assert!(state.error.is_none());
        assert_eq!(state.comparison.unwrap()["asset"], "EURUSD");
        assert_eq!(state.message.as_deref(), Some("optimized EURUSD"));
    }
}
