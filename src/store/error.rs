//! Store error types
//!
//! Defines all errors that can occur in the persistence layer.

use thiserror::Error;

/// Errors that can occur in the occupancy store
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite call failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading addressed a sensor the chip does not have
    #[error("Sensor not found: {sensor_id} on chip {chip_id}")]
    SensorNotFound { chip_id: String, sensor_id: String },

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::SensorNotFound {
            chip_id: "esp32-1".to_string(),
            sensor_id: "chair-9".to_string(),
        };
        assert_eq!(err.to_string(), "Sensor not found: chair-9 on chip esp32-1");

        let err = StoreError::Lock("poisoned".to_string());
        assert_eq!(err.to_string(), "Lock error: poisoned");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }
}
