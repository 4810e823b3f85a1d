// In crates/data-source/src/remote.rs

use api_client::ApiClient;
use async_trait::async_trait;
use core_types::{
    AnalysisSnapshot, Asset, CollectionMethod, CollectionOverview, CollectionStatus,
    DashboardSnapshot, Signal, Timeframe,
};
use serde_json::Value;

use crate::{DataSource, Result};

/// A source that forwards every request to the external backend.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    api_client: ApiClient,
}

impl RemoteSource {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    fn name(&self) -> &'static str {
        "RemoteSource"
    }

    async fn health(&self) -> Result<()> {
        let health = self.api_client.health().await?;
        tracing::debug!(
            current_pair = ?health.current_pair,
            version = ?health.version,
            "Backend is healthy."
        );
        Ok(())
    }

    /// The backend owns signal history; the list starts empty and fills from `next_signal`.
    async fn initial_signals(&self) -> Result<Vec<Signal>> {
        Ok(Vec::new())
    }

    async fn dashboard(&self) -> Result<DashboardSnapshot> {
        Ok(self.api_client.dashboard().await?)
    }

    async fn analysis(&self, asset: Asset, timeframe: Timeframe) -> Result<AnalysisSnapshot> {
        // The backend analyses whichever pair is selected, so select first.
        let selection = self.api_client.select_pair(asset).await?;
        tracing::debug!(pair = %selection.selected_pair, %timeframe, "Pair selected for analysis.");
        Ok(self.api_client.comprehensive_analysis(timeframe).await?)
    }

    async fn indicators(&self) -> Result<Value> {
        Ok(self.api_client.indicators().await?)
    }

    async fn stability_report(&self) -> Result<Value> {
        Ok(self.api_client.stability_report().await?)
    }

    async fn performance(&self) -> Result<Value> {
        Ok(self.api_client.performance().await?)
    }

    async fn next_signal(&self) -> Result<Signal> {
        Ok(self.api_client.latest_signal().await?)
    }

    async fn collection_overview(&self) -> Result<CollectionOverview> {
        let (status, prices) = tokio::try_join!(
            self.api_client.data_collection_status(),
            self.api_client.latest_prices()
        )?;
        Ok(CollectionOverview { status, prices })
    }

    async fn start_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        Ok(self.api_client.start_data_collection(method).await?)
    }

    async fn stop_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        Ok(self.api_client.stop_data_collection(method).await?)
    }

    async fn compare_prices(&self, asset: Asset) -> Result<Value> {
        Ok(self.api_client.compare_prices(asset).await?)
    }

    async fn optimize_simulation(&self, asset: Asset) -> Result<String> {
        Ok(self.api_client.optimize_simulation(asset).await?)
    }
}
