//! Tablewatch occupancy store
//!
//! - **types**: Chip, Sensor, readings and the display ordering
//! - **db**: SQLite persistence and batch reconciliation
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use tablewatch::store::{SensorReading, Store, UnknownSensorPolicy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("./tablewatch.db")?;
//!
//!     store.reconcile(
//!         "esp32-1",
//!         &[SensorReading::new("chair-1", true), SensorReading::new("chair-2", false)],
//!         UnknownSensorPolicy::Create,
//!     )?;
//!
//!     for chip in store.list_chips()? {
//!         println!("{}: {}/{} occupied", chip.id, chip.occupied_count(), chip.sensors.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod types;

pub use db::{demo_readings, Store, UnknownSensorPolicy, DEMO_CHIP_ID, IN_MEMORY};
pub use error::{StoreError, StoreResult};
pub use types::{
    natural_cmp, suffix_key, Chip, ReconcileOutcome, Sensor, SensorReading, StoreStats,
};
