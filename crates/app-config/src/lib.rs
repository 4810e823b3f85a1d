// In crates/app-config/src/lib.rs

use config::{Config, Environment, File, FileFormat};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    ApiSettings, AppSettings, DataSourceKind, DataSourceSettings, RefreshSettings, ServerSettings,
    Settings, SignalFeed, SignalFeedSettings,
};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file (optional, every field has a default).
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base").required(false))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // e.g. `APP_DATA_SOURCE__KIND=remote`, `APP_API__BASE_URL=...`
        .add_source(Environment::with_prefix("APP").prefix_separator("_").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    validate(&settings)?;

    tracing::debug!(
        environment = %settings.app.environment,
        data_source = ?settings.data_source.kind,
        "Settings loaded."
    );
    Ok(settings)
}

/// Builds settings from a single TOML document, without touching files or the environment.
pub fn settings_from_toml(contents: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(contents, FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    let base_url = settings.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(Error::InvalidSetting {
            field: "api.base_url",
            reason: format!("expected an http(s) URL, got `{}`", base_url),
        });
    }
    Ok(())
}
