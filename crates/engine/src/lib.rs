// In crates/engine/src/lib.rs

pub mod analysis;
pub mod collection;
pub mod dashboard;
pub mod refresh;
pub mod signal_feed;
pub mod status;

#[cfg(test)]
mod testing;

pub use analysis::{AnalysisState, AnalysisView};
pub use collection::{CollectionState, CollectionView};
pub use dashboard::{DashboardState, DashboardView};
pub use refresh::{RefreshHandle, RefreshLoop};
pub use signal_feed::{SignalFeedSnapshot, SignalsView};
pub use status::LoadStatus;

use anyhow::Result;
use app_config::{RefreshSettings, Settings};
use data_source::{DataSource, create_data_source};
use events::DashboardEvent;
use futures::future;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Every page's view, cheap to clone and share with request handlers.
#[derive(Clone)]
pub struct Views {
    pub dashboard: DashboardView,
    pub signals: SignalsView,
    pub analysis: AnalysisView,
    pub collection: CollectionView,
}

/// The orchestrator that keeps every page fresh.
pub struct Engine {
    source: Arc<dyn DataSource>,
    refresh: RefreshSettings,
    views: Views,
}

impl Engine {
    pub fn new(
        source: Arc<dyn DataSource>,
        settings: &Settings,
        ws_tx: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        let views = Views {
            dashboard: DashboardView::new(source.clone(), ws_tx.clone()),
            signals: SignalsView::new(source.clone(), settings.signals.window(), ws_tx.clone()),
            analysis: AnalysisView::new(source.clone(), ws_tx.clone()),
            collection: CollectionView::new(source.clone(), ws_tx),
        };
        Self {
            source,
            refresh: settings.refresh.clone(),
            views,
        }
    }

    /// Builds the engine on the data source the settings select.
    pub fn from_settings(settings: &Settings, ws_tx: broadcast::Sender<DashboardEvent>) -> Result<Self> {
        let source = create_data_source(settings)?;
        Ok(Self::new(source, settings, ws_tx))
    }

    pub fn views(&self) -> Views {
        self.views.clone()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Asks the data source whether it can serve requests. A failure is only
    /// logged; the pages report their own errors once the loops run.
    pub async fn check_source(&self) -> bool {
        match self.source.health().await {
            Ok(()) => {
                tracing::info!(source = self.source.name(), "Data source is reachable.");
                true
            }
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Data source health check failed.");
                false
            }
        }
    }

    /// Spawns one refresh loop per page at its configured interval.
    pub fn start(&self) -> EngineHandle {
        tracing::info!(source = self.source.name(), "Starting page refresh loops...");

        let dashboard = self.views.dashboard.clone();
        let signals = self.views.signals.clone();
        let analysis = self.views.analysis.clone();
        let collection = self.views.collection.clone();

        let loops = vec![
            RefreshLoop::start("dashboard", self.refresh.dashboard(), move || {
                let view = dashboard.clone();
                async move { view.refresh().await }
            }),
            RefreshLoop::start("signals", self.refresh.signals(), move || {
                let view = signals.clone();
                async move { view.refresh().await }
            }),
            RefreshLoop::start("analysis", self.refresh.analysis(), move || {
                let view = analysis.clone();
                async move { view.refresh().await }
            }),
            RefreshLoop::start("collection", self.refresh.collection(), move || {
                let view = collection.clone();
                async move { view.refresh().await }
            }),
        ];

        tracing::info!(count = loops.len(), "All refresh loops have been spawned.");
        EngineHandle { loops }
    }
}

/// The running refresh loops. Dropping the handle cancels all of them.
pub struct EngineHandle {
    loops: Vec<RefreshHandle>,
}

impl EngineHandle {
    pub fn cancel(&self) {
        self.loops.iter().for_each(RefreshHandle::cancel);
    }

    /// Cancels every loop and waits until all of them are gone.
    pub async fn shutdown(self) {
        tracing::info!("Stopping page refresh loops.");
        future::join_all(self.loops.into_iter().map(RefreshHandle::shutdown)).await;
    }

    pub fn page_names(&self) -> Vec<&'static str> {
        self.loops.iter().map(RefreshHandle::name).collect()
    }
}
