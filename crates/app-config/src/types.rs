// In crates/app-config/src/types.rs

use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Where the external backend lives.
    #[serde(default)]
    pub api: ApiSettings,
    /// Which implementation feeds the pages.
    #[serde(default)]
    pub data_source: DataSourceSettings,
    /// Per-page polling intervals.
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub signals: SignalFeedSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSettings {
    /// Base URL of the backend REST API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. Zero leaves the client default in place.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Remote,
    #[default]
    Simulated,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DataSourceSettings {
    #[serde(default)]
    pub kind: DataSourceKind,
    /// Artificial delay before a simulated response is returned.
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
    /// Fixed RNG seed for reproducible simulations.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl DataSourceSettings {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for DataSourceSettings {
    fn default() -> Self {
        Self {
            kind: DataSourceKind::default(),
            simulated_latency_ms: default_simulated_latency_ms(),
            seed: None,
        }
    }
}

/// Refresh intervals in seconds. `0` means the page only refreshes on activation.
#[derive(Deserialize, Debug, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_five_minutes")]
    pub dashboard_secs: u64,
    #[serde(default = "default_five_minutes")]
    pub signals_secs: u64,
    #[serde(default)]
    pub analysis_secs: u64,
    #[serde(default = "default_thirty_seconds")]
    pub collection_secs: u64,
}

impl RefreshSettings {
    pub fn dashboard(&self) -> Option<Duration> {
        as_period(self.dashboard_secs)
    }

    pub fn signals(&self) -> Option<Duration> {
        as_period(self.signals_secs)
    }

    pub fn analysis(&self) -> Option<Duration> {
        as_period(self.analysis_secs)
    }

    pub fn collection(&self) -> Option<Duration> {
        as_period(self.collection_secs)
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            dashboard_secs: default_five_minutes(),
            signals_secs: default_five_minutes(),
            analysis_secs: 0,
            collection_secs: default_thirty_seconds(),
        }
    }
}

/// Which of the two signal pages the feed mimics.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalFeed {
    /// The compact list: eight seeded signals, no indicator votes.
    #[default]
    List,
    /// The full page: five seeded signals with per-indicator votes.
    Page,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SignalFeedSettings {
    #[serde(default)]
    pub feed: SignalFeed,
    /// How many signals the list keeps before dropping the oldest.
    /// `0` keeps everything.
    #[serde(default = "default_window")]
    pub window: usize,
}

impl SignalFeedSettings {
    pub fn window(&self) -> Option<usize> {
        (self.window > 0).then_some(self.window)
    }
}

impl Default for SignalFeedSettings {
    fn default() -> Self {
        Self {
            feed: SignalFeed::default(),
            window: default_window(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

fn as_period(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// Helper functions for serde defaults
fn default_timeout_secs() -> u64 { 10 }
fn default_simulated_latency_ms() -> u64 { 1500 }
fn default_five_minutes() -> u64 { 300 }
fn default_thirty_seconds() -> u64 { 30 }
fn default_window() -> usize { 8 }
