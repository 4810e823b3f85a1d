// In crates/data-source/src/factory.rs

use api_client::ApiClient;
use app_config::{DataSourceKind, Settings};
use std::sync::Arc;

use crate::{DataSource, RemoteSource, Result, SimulatedSource};

/// Builds the data source selected by `data_source.kind`.
pub fn create_data_source(settings: &Settings) -> Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match settings.data_source.kind {
        DataSourceKind::Remote => Arc::new(RemoteSource::new(ApiClient::new(&settings.api)?)),
        DataSourceKind::Simulated => {
            Arc::new(SimulatedSource::new(&settings.data_source, settings.signals.feed)?)
        }
    };

    tracing::info!(source = source.name(), "Data source created.");
    Ok(source)
}
