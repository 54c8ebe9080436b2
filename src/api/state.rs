//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::dashboard;
use crate::config::Config;
use crate::store::{Store, StoreResult, UnknownSensorPolicy};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Chip and sensor store
    pub store: Arc<Store>,
    /// Service configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Dashboard page, rendered once at startup
    pub dashboard_html: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        let dashboard_html = dashboard::render(&config.dashboard).into();

        Self {
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
            dashboard_html,
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// How ingestion treats sensors a known chip reports for the first time
    pub fn unknown_sensor_policy(&self) -> UnknownSensorPolicy {
        UnknownSensorPolicy::from_auto_create(self.config.ingest.auto_create_sensors)
    }

    /// Run a blocking store call off the async workers
    pub async fn with_store<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);

        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
