//! Health Routes
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health/ready - Readiness check (store answers queries)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::store::StoreStats;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 if the store answers a trivial query.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.with_store(|store| store.ping()).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Store not ready: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /health
///
/// Full health status with row counts.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.with_store(|store| store.stats()).await;

    let (status, store, stats) = match stats {
        Ok(stats) => ("healthy", "ok", stats),
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            ("unhealthy", "error", StoreStats::default())
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        store: store.to_string(),
        chips: stats.chips,
        sensors: stats.sensors,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
