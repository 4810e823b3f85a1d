// In crates/api-client/src/lib.rs

use app_config::ApiSettings;
use core_types::{
    AnalysisSnapshot, Asset, CollectionMethod, CollectionStatus, DashboardSnapshot, LatestPrices,
    Signal, Timeframe,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// A client for the dashboard's backend REST API.
///
/// Every endpoint answers with an [`ApiEnvelope`]; only `status == "success"`
/// is treated as a usable response.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Constructs a new ApiClient from ApiSettings.
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and decodes the envelope from the body.
    ///
    /// Non-2xx responses are still decoded: the backend reports failures inside
    /// the envelope, and the caller only looks at `status`.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<ApiEnvelope<T>> {
        let response = request.send().await.map_err(Error::RequestFailed)?;
        let http_status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        serde_json::from_str::<ApiEnvelope<T>>(&text).map_err(|e| {
            tracing::debug!(%http_status, body = %text, "Response is not a valid envelope.");
            Error::DeserializationFailed(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiEnvelope<T>> {
        let request = self.http_client.get(self.url(path)).query(query);
        self.send(request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>> {
        let request = self.http_client.post(self.url(path)).json(body);
        self.send(request).await
    }

    // --- Pair / analysis endpoints ---

    /// Makes `pair` the backend's current analysis target.
    ///
    /// This corresponds to the `POST /pair/select` endpoint.
    pub async fn select_pair(&self, pair: Asset) -> Result<PairSelection> {
        self.post("/pair/select", &SelectPairRequest { pair })
            .await?
            .into_data()
    }

    /// Fetches the comprehensive analysis of the currently selected pair.
    ///
    /// This corresponds to the `GET /analysis/comprehensive` endpoint.
    pub async fn comprehensive_analysis(&self, timeframe: Timeframe) -> Result<AnalysisSnapshot> {
        self.get("/analysis/comprehensive", &[("timeframe", timeframe.as_str())])
            .await?
            .into_data()
    }

    /// `GET /indicators`. The payload shape belongs to the backend.
    pub async fn indicators(&self) -> Result<Value> {
        self.get("/indicators", &[]).await?.into_data()
    }

    /// `GET /stability/report`.
    pub async fn stability_report(&self) -> Result<Value> {
        self.get("/stability/report", &[]).await?.into_data()
    }

    /// `GET /performance`.
    pub async fn performance(&self) -> Result<Value> {
        self.get("/performance", &[]).await?.into_data()
    }

    // --- Dashboard / signals ---

    /// `GET /dashboard`.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot> {
        self.get("/dashboard", &[]).await?.into_data()
    }

    /// Fetches the newest signal the backend has issued.
    ///
    /// This corresponds to the `GET /signals/latest` endpoint.
    pub async fn latest_signal(&self) -> Result<Signal> {
        self.get("/signals/latest", &[]).await?.into_data()
    }

    // --- Data collection ---

    /// `GET /data-collection/status`.
    pub async fn data_collection_status(&self) -> Result<CollectionStatus> {
        self.get("/data-collection/status", &[]).await?.into_data()
    }

    /// `GET /prices/latest`.
    pub async fn latest_prices(&self) -> Result<LatestPrices> {
        self.get("/prices/latest", &[]).await?.into_data()
    }

    /// Compares the prices each channel reports for `asset`.
    ///
    /// This corresponds to the `GET /prices/compare?asset=...` endpoint.
    pub async fn compare_prices(&self, asset: Asset) -> Result<Value> {
        self.get("/prices/compare", &[("asset", asset.as_str())])
            .await?
            .into_data()
    }

    /// `POST /data-collection/start` with `{ "method": ... }`.
    pub async fn start_data_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        tracing::info!(%method, "Requesting data collection start.");
        self.post("/data-collection/start", &CollectionCommand { method })
            .await?
            .into_data()
    }

    /// `POST /data-collection/stop` with `{ "method": ... }`.
    pub async fn stop_data_collection(&self, method: CollectionMethod) -> Result<CollectionStatus> {
        tracing::info!(%method, "Requesting data collection stop.");
        self.post("/data-collection/stop", &CollectionCommand { method })
            .await?
            .into_data()
    }

    /// Asks the backend to re-tune its price simulator for `asset`.
    /// Returns the backend's human-readable message.
    ///
    /// This corresponds to the `POST /simulation/optimize` endpoint.
    pub async fn optimize_simulation(&self, asset: Asset) -> Result<String> {
        self.post::<_, Value>("/simulation/optimize", &OptimizeSimulationRequest { asset })
            .await?
            .into_message()
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health", &[]).await?.into_data()
    }
}
