//! Core data types for the occupancy store
//!
//! - [`Chip`]: a reporting device, one per table
//! - [`Sensor`]: a single chair detector owned by a chip
//! - [`SensorReading`]: one status report for a sensor, as sent by a chip
//! - [`ReconcileOutcome`]: what an ingestion did to the store

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;

/// A reporting device (e.g. an ESP32 controller) representing one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    /// Device-assigned identifier
    pub id: String,
    /// Display name, defaults to the id
    pub name: String,
    /// Sensors owned by this chip, in display order
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl Chip {
    /// Create a chip whose name is its id, with no sensors
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            sensors: Vec::new(),
        }
    }

    /// Number of sensors currently reporting occupied
    pub fn occupied_count(&self) -> usize {
        self.sensors.iter().filter(|s| s.status).count()
    }

    /// Sort sensors by the numeric suffix of their id
    pub fn sort_sensors(&mut self) {
        self.sensors.sort_by(|a, b| natural_cmp(&a.id, &b.id));
    }
}

/// A chair-occupancy detector attached to a chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// Identifier, unique within the owning chip
    pub id: String,
    /// true = occupied, false = available
    pub status: bool,
    /// Owning chip
    pub chip_id: String,
}

/// A single status report for one sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: String,
    pub status: bool,
}

impl SensorReading {
    pub fn new(id: impl Into<String>, status: bool) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Result of reconciling a batch of readings with the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOutcome {
    /// The chip did not exist and was created
    pub chip_created: bool,
    /// Sensor rows inserted
    pub sensors_created: usize,
    /// Sensor rows whose status was rewritten
    pub sensors_updated: usize,
}

/// Row counts for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub chips: usize,
    pub sensors: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chips={}, sensors={}", self.chips, self.sensors)
    }
}

fn suffix_regex() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| Regex::new(r"(\d+)$").expect("suffix pattern is valid"))
}

/// Numeric suffix embedded at the end of an id ("chair-10" → 10)
///
/// Ids without a trailing number, or with one too large for a u64, map to 0.
pub fn suffix_key(id: &str) -> u64 {
    suffix_regex()
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Display order for ids: numeric suffix first, then the id itself
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    suffix_key(a)
        .cmp(&suffix_key(b))
        .then_with(|| a.cmp(b))
}
