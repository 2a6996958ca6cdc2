use metrics_exporter_prometheus::PrometheusHandle;
use sponsor_tracker::config::AppConfig;
use sponsor_tracker::error::AppError;
use sponsor_tracker::store::SqliteStore;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn open_store(config: &AppConfig) -> Result<Arc<SqliteStore>, AppError> {
    let store = SqliteStore::open(&config.database.path)?;
    tracing::info!(path = %config.database.path.display(), "database ready");
    Ok(Arc::new(store))
}
