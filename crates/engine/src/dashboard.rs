// In crates/engine/src/dashboard.rs

use chrono::{DateTime, Utc};
use core_types::DashboardSnapshot;
use data_source::DataSource;
use events::DashboardEvent;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::LoadStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    /// The last successfully loaded snapshot. Kept through failed refreshes.
    pub snapshot: Option<DashboardSnapshot>,
    pub status: LoadStatus,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// The dashboard page: signal counts, asset trends and performance stats.
#[derive(Clone)]
pub struct DashboardView {
    source: Arc<dyn DataSource>,
    state: Arc<RwLock<DashboardState>>,
    ws_tx: broadcast::Sender<DashboardEvent>,
}

impl DashboardView {
    pub fn new(source: Arc<dyn DataSource>, ws_tx: broadcast::Sender<DashboardEvent>) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(DashboardState::default())),
            ws_tx,
        }
    }

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Fetches a fresh snapshot. Failures are logged and the previous
    /// snapshot stays visible.
    pub async fn refresh(&self) {
        self.state.write().await.status = LoadStatus::Loading;

        match self.source.dashboard().await {
            Ok(snapshot) => {
                {
                    let mut state = self.state.write().await;
                    state.snapshot = Some(snapshot.clone());
                    state.status = LoadStatus::Success;
                    state.last_refreshed = Some(Utc::now());
                }
                tracing::debug!(active = snapshot.signals.active, "Dashboard refreshed.");
                let _ = self.ws_tx.send(DashboardEvent::DashboardUpdated(snapshot));
            }
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Dashboard refresh failed; keeping the previous snapshot.");
                self.state.write().await.status = LoadStatus::Error;
            }
        }
    }
}
