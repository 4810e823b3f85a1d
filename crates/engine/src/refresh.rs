// In crates/engine/src/refresh.rs

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Periodic driver for one page's refresh.
pub struct RefreshLoop;

impl RefreshLoop {
    /// Runs `job` once right away, then once per elapsed `period`.
    ///
    /// The first call to `job` happens before this function returns; its
    /// future and every later one run on a spawned task. With `period: None`
    /// the page refreshes only on activation. Must be called inside a Tokio
    /// runtime.
    ///
    /// Refreshes never overlap: when one takes longer than `period`, the next
    /// tick is delayed instead of piling up.
    pub fn start<F, Fut>(name: &'static str, period: Option<Duration>, mut job: F) -> RefreshHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let activated_at = Instant::now();
        let first = job();

        let task = tokio::spawn(async move {
            first.await;

            let Some(period) = period else {
                tracing::debug!(page = name, "Refreshed once; no periodic refresh configured.");
                return;
            };

            let mut ticker = time::interval_at(activated_at + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::trace!(page = name, "Periodic refresh.");
                job().await;
            }
        });

        tracing::debug!(page = name, ?period, "Refresh loop started.");
        RefreshHandle { name, task }
    }
}

/// Owner of a running refresh loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct RefreshHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stops the loop. An in-flight refresh is dropped at its next await
    /// point, so its result is never applied.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            tracing::debug!(page = self.name, "Refresh loop cancelled.");
        }
        self.task.abort();
    }

    /// Cancels the loop and waits until its task is gone.
    pub async fn shutdown(mut self) {
        self.task.abort();
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                tracing::error!(page = self.name, error = %e, "Refresh loop panicked.");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
