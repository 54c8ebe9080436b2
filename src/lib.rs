//! # Tablewatch
//!
//! Table occupancy collector. ESP32-style chips report chair sensors over
//! HTTP, and a dashboard page shows which seats around each table are taken.
//!
//! ## Modules
//!
//! - [`store`]: SQLite persistence and reconciliation of incoming readings
//! - [`api`]: HTTP API and dashboard with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablewatch::store::{SensorReading, Store, UnknownSensorPolicy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open_in_memory()?;
//!
//!     // First report from a chip creates it along with its sensors
//!     store.reconcile(
//!         "esp32-1",
//!         &[SensorReading::new("chair-1", true), SensorReading::new("chair-2", false)],
//!         UnknownSensorPolicy::Create,
//!     )?;
//!
//!     // Later reports update the sensors in place
//!     store.reconcile(
//!         "esp32-1",
//!         &[SensorReading::new("chair-1", false)],
//!         UnknownSensorPolicy::Create,
//!     )?;
//!
//!     let chips = store.list_chips()?;
//!     println!("{} chip(s), {} seat(s) taken", chips.len(), chips[0].occupied_count());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Chip, ReconcileOutcome, Sensor, SensorReading, Store, StoreError, StoreResult, StoreStats,
    UnknownSensorPolicy,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    ApiConfig, Config, ConfigError, DashboardConfig, IngestConfig, LoggingConfig, StoreConfig,
};
