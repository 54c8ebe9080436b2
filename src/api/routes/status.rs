//! Status Routes
//!
//! - GET /api/status - All chips with their sensors, for the dashboard

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{StatusResponse, ACK_MESSAGE};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/status
///
/// Chips and their sensors are ordered by the number at the end of their id,
/// so "chair-2" comes before "chair-10".
pub async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    let chips = state.with_store(|store| store.list_chips()).await?;

    tracing::debug!(chips = chips.len(), "Serving status");

    Ok(Json(StatusResponse {
        message: ACK_MESSAGE.to_string(),
        chips,
    }))
}
