// In crates/data-source/src/lib.rs

use async_trait::async_trait;
use core_types::{
    AnalysisSnapshot, Asset, CollectionMethod, CollectionOverview, CollectionStatus,
    DashboardSnapshot, Signal, Timeframe,
};
use serde_json::Value;

pub mod error;
pub mod factory;
pub mod remote;
pub mod simulated;

// Re-export public types
pub use error::{Error, Result};
pub use factory::create_data_source;
pub use remote::RemoteSource;
pub use simulated::SimulatedSource;

/// The universal interface behind every page's data.
///
/// A `DataSource` either forwards to the external backend or synthesizes
/// plausible values locally. Pages never know which one they are talking to.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The name of the source (e.g., "RemoteSource", "SimulatedSource").
    fn name(&self) -> &'static str;

    /// Fails when the source cannot currently serve requests.
    async fn health(&self) -> Result<()>;

    /// Signals a signal list starts with, newest first.
    async fn initial_signals(&self) -> Result<Vec<Signal>>;

    async fn dashboard(&self) -> Result<DashboardSnapshot>;

    /// Technical analysis for `asset` on `timeframe`.
    async fn analysis(&self, asset: Asset, timeframe: Timeframe) -> Result<AnalysisSnapshot>;

    /// Per-indicator detail for the analysis page. Opaque payload.
    async fn indicators(&self) -> Result<Value>;

    /// Signal stability metrics and recommendations. Opaque payload.
    async fn stability_report(&self) -> Result<Value>;

    /// Aggregate signal performance. Opaque payload.
    async fn performance(&self) -> Result<Value>;

    /// The next signal to prepend to a signal list.
    async fn next_signal(&self) -> Result<Signal>;

    /// Channel status and the latest prices, fetched together.
    async fn collection_overview(&self) -> Result<CollectionOverview>;

    async fn start_collection(&self, method: CollectionMethod) -> Result<CollectionStatus>;

    async fn stop_collection(&self, method: CollectionMethod) -> Result<CollectionStatus>;

    /// Per-channel prices for one asset. The payload shape is opaque.
    async fn compare_prices(&self, asset: Asset) -> Result<Value>;

    /// Re-tunes the price simulator for `asset` and returns a human-readable message.
    async fn optimize_simulation(&self, asset: Asset) -> Result<String>;
}
