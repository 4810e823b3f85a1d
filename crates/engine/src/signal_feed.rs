// In crates/engine/src/signal_feed.rs

use chrono::{DateTime, Utc};
use core_types::{Signal, SignalStatus};
use data_source::DataSource;
use events::{DashboardEvent, SignalAdded};
use serde::Serialize;
use signals::{SignalBook, SignalCriteria};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::LoadStatus;

struct SignalFeedState {
    book: SignalBook,
    criteria: SignalCriteria,
    seeded: bool,
    status: LoadStatus,
    last_refreshed: Option<DateTime<Utc>>,
}

/// What the signals page renders: the filtered list plus the filter itself.
#[derive(Debug, Clone, Serialize)]
pub struct SignalFeedSnapshot {
    pub signals: Vec<Signal>,
    /// Size of the unfiltered list.
    pub total: usize,
    pub criteria: SignalCriteria,
    pub status: LoadStatus,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// The signals page: a bounded, newest-first list and its filter bar.
#[derive(Clone)]
pub struct SignalsView {
    source: Arc<dyn DataSource>,
    state: Arc<RwLock<SignalFeedState>>,
    /// Held for a whole refresh so the seed is loaded exactly once.
    refreshing: Arc<Mutex<()>>,
    ws_tx: broadcast::Sender<DashboardEvent>,
}

impl SignalsView {
    pub fn new(
        source: Arc<dyn DataSource>,
        window: Option<usize>,
        ws_tx: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(SignalFeedState {
                book: SignalBook::new(window),
                criteria: SignalCriteria::default(),
                seeded: false,
                status: LoadStatus::Idle,
                last_refreshed: None,
            })),
            refreshing: Arc::new(Mutex::new(())),
            ws_tx,
        }
    }

    /// The first refresh loads the source's initial list; when that list is
    /// empty it goes on to fetch a signal. Every later refresh prepends the
    /// source's next signal. Concurrent calls run one after the other.
    pub async fn refresh(&self) {
        let _refreshing = self.refreshing.lock().await;
        let seeded = {
            let mut state = self.state.write().await;
            state.status = LoadStatus::Loading;
            state.seeded
        };

        if !seeded {
            match self.source.initial_signals().await {
                Ok(initial) => {
                    let mut state = self.state.write().await;
                    let seeded_any = !initial.is_empty();
                    state.book = SignalBook::with_signals(initial, state.book.window());
                    state.seeded = true;
                    if seeded_any {
                        tracing::info!(count = state.book.len(), "Signal list seeded.");
                        state.status = LoadStatus::Success;
                        state.last_refreshed = Some(Utc::now());
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load the initial signal list.");
                    self.state.write().await.status = LoadStatus::Error;
                    return;
                }
            }
        }

        let signal = match self.source.next_signal().await {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Signal refresh failed; keeping the current list.");
                self.state.write().await.status = LoadStatus::Error;
                return;
            }
        };

        if let Err(e) = signal.validate() {
            tracing::warn!(id = signal.id, error = %e, "Discarding invalid signal.");
            self.state.write().await.status = LoadStatus::Error;
            return;
        }

        let dropped = {
            let mut state = self.state.write().await;
            state.status = LoadStatus::Success;
            state.last_refreshed = Some(Utc::now());
            if state.book.get(signal.id).is_some() {
                tracing::debug!(id = signal.id, "Signal already listed.");
                return;
            }
            state.book.prepend(signal.clone())
        };

        tracing::info!(
            id = signal.id,
            asset = %signal.asset,
            signal_type = %signal.signal_type,
            confidence = signal.confidence,
            "New signal."
        );
        let _ = self.ws_tx.send(DashboardEvent::SignalAdded(SignalAdded { signal, dropped }));
    }

    pub async fn set_criteria(&self, criteria: SignalCriteria) {
        self.state.write().await.criteria = criteria;
    }

    pub async fn criteria(&self) -> SignalCriteria {
        self.state.read().await.criteria.clone()
    }

    /// The list filtered by the current criteria, recomputed on every call.
    pub async fn visible(&self) -> Vec<Signal> {
        let state = self.state.read().await;
        state.book.filtered(&state.criteria)
    }

    /// The list filtered by `criteria`, leaving the page's own filter alone.
    pub async fn matching(&self, criteria: &SignalCriteria) -> Vec<Signal> {
        self.state.read().await.book.filtered(criteria)
    }

    pub async fn all(&self) -> Vec<Signal> {
        self.state.read().await.book.to_vec()
    }

    pub async fn snapshot(&self) -> SignalFeedSnapshot {
        let state = self.state.read().await;
        SignalFeedSnapshot {
            signals: state.book.filtered(&state.criteria),
            total: state.book.len(),
            criteria: state.criteria.clone(),
            status: state.status,
            last_refreshed: state.last_refreshed,
        }
    }

    /// Explicitly changes a listed signal's status. Returns `false` for unknown ids.
    pub async fn set_status(&self, id: u64, status: SignalStatus) -> bool {
        self.state.write().await.book.set_status(id, status)
    }
}
