//! Ingest Routes
//!
//! - POST /data - Batch of sensor readings from one chip

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::dto::{IngestRequest, MessageResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Longest chip or sensor id accepted, in bytes
pub const MAX_ID_LEN: usize = 64;

/// POST /data
///
/// Create the chip and its sensors on first contact, otherwise update the
/// reported sensors. The batch is applied atomically.
pub async fn ingest_readings(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;

    validate_ingest_request(&req, state.config.ingest.max_batch_size)?;

    let policy = state.unknown_sensor_policy();
    let chip_id = req.chip_id.clone();
    let readings = req.sensors.len();

    let outcome = state
        .with_store(move |store| store.reconcile(&req.chip_id, &req.sensors, policy))
        .await?;

    tracing::info!(
        chip_id = %chip_id,
        readings,
        chip_created = outcome.chip_created,
        sensors_created = outcome.sensors_created,
        sensors_updated = outcome.sensors_updated,
        "Readings applied"
    );

    Ok(Json(MessageResponse::ack()))
}

/// Validate an ingest request before it reaches the store
pub fn validate_ingest_request(req: &IngestRequest, max_batch_size: usize) -> ApiResult<()> {
    validate_id("chipId", &req.chip_id)?;

    if req.sensors.len() > max_batch_size {
        return Err(ApiError::Validation(format!(
            "Batch of {} readings exceeds maximum of {}",
            req.sensors.len(),
            max_batch_size
        )));
    }

    let mut seen = HashSet::with_capacity(req.sensors.len());
    for reading in &req.sensors {
        validate_id("sensor id", &reading.id)?;

        if !seen.insert(reading.id.as_str()) {
            return Err(ApiError::Validation(format!(
                "Duplicate sensor id '{}' in batch",
                reading.id
            )));
        }
    }

    Ok(())
}

fn validate_id(field: &str, id: &str) -> ApiResult<()> {
    if id.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} cannot be empty", field)));
    }

    if id.len() > MAX_ID_LEN {
        return Err(ApiError::Validation(format!(
            "{} exceeds maximum length of {} bytes",
            field, MAX_ID_LEN
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SensorReading;

    fn request(chip_id: &str, ids: &[&str]) -> IngestRequest {
        IngestRequest {
            chip_id: chip_id.to_string(),
            sensors: ids.iter().map(|id| SensorReading::new(*id, true)).collect(),
        }
    }

    #[test]
    fn test_validate_valid() {
        assert!(validate_ingest_request(&request("esp32-1", &["chair-1", "chair-2"]), 64).is_ok());
    }

    #[test]
    fn test_validate_empty_batch_allowed() {
        assert!(validate_ingest_request(&request("esp32-1", &[]), 64).is_ok());
    }

    #[test]
    fn test_validate_empty_chip_id() {
        assert!(validate_ingest_request(&request("", &["chair-1"]), 64).is_err());
        assert!(validate_ingest_request(&request("   ", &["chair-1"]), 64).is_err());
    }

    #[test]
    fn test_validate_empty_sensor_id() {
        assert!(validate_ingest_request(&request("esp32-1", &[""]), 64).is_err());
    }

    #[test]
    fn test_validate_long_id() {
        let long = "x".repeat(MAX_ID_LEN + 1);
        assert!(validate_ingest_request(&request(&long, &[]), 64).is_err());
        assert!(validate_ingest_request(&request("esp32-1", &[long.as_str()]), 64).is_err());
    }

    #[test]
    fn test_validate_duplicate_sensor() {
        let err = validate_ingest_request(&request("esp32-1", &["chair-1", "chair-1"]), 64)
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate sensor id 'chair-1'"));
    }

    #[test]
    fn test_validate_batch_limit() {
        assert!(validate_ingest_request(&request("esp32-1", &["a1", "a2", "a3"]), 2).is_err());
    }
}
