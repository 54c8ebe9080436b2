//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::store::{Chip, SensorReading};

/// Acknowledgement text shared by the ingest and status endpoints
pub const ACK_MESSAGE: &str = "Data received successfully";

// ============================================
// INGEST DTOs
// ============================================

/// Batch of readings reported by one chip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    /// Device-assigned chip identifier
    pub chip_id: String,
    /// Current status of each sensor on the chip
    pub sensors: Vec<SensorReading>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ack() -> Self {
        Self {
            message: ACK_MESSAGE.to_string(),
        }
    }
}

// ============================================
// STATUS DTOs
// ============================================

/// All chips with their sensors, in display order
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub chips: Vec<Chip>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Store status: "ok" or "error"
    pub store: String,
    /// Chips known to the store
    pub chips: usize,
    /// Sensors known to the store
    pub sensors: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_request_from_device_json() {
        let req: IngestRequest = serde_json::from_str(
            r#"{"chipId": "esp32-1", "sensors": [{"id": "chair-1", "status": true}]}"#,
        )
        .unwrap();

        assert_eq!(req.chip_id, "esp32-1");
        assert_eq!(req.sensors, vec![SensorReading::new("chair-1", true)]);
    }

    #[test]
    fn test_ingest_request_rejects_string_status() {
        let result: Result<IngestRequest, _> = serde_json::from_str(
            r#"{"chipId": "esp32-1", "sensors": [{"id": "chair-1", "status": "yes"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ingest_request_requires_sensors() {
        let result: Result<IngestRequest, _> = serde_json::from_str(r#"{"chipId": "esp32-1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_ack_message() {
        let json = serde_json::to_string(&MessageResponse::ack()).unwrap();
        assert_eq!(json, r#"{"message":"Data received successfully"}"#);
    }
}
