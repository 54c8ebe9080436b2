//! SQLite-backed chip and sensor store
//!
//! Holds one connection behind a mutex. Every ingestion runs in a single
//! transaction, so a batch of readings is applied all-or-nothing and two
//! requests for the same chip can never interleave.

use super::error::{StoreError, StoreResult};
use super::types::{natural_cmp, Chip, ReconcileOutcome, Sensor, SensorReading, StoreStats};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;

    CREATE TABLE IF NOT EXISTS chips (
        id TEXT NOT NULL PRIMARY KEY,
        name TEXT NOT NULL
    );

    -- A sensor is addressed by its owning chip plus its own id.
    CREATE TABLE IF NOT EXISTS sensors (
        chip_id TEXT NOT NULL REFERENCES chips (id) ON DELETE CASCADE,
        id TEXT NOT NULL,
        status INTEGER NOT NULL,
        PRIMARY KEY (chip_id, id)
    );
";

/// Path value that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Demo table reported by the sample firmware
pub const DEMO_CHIP_ID: &str = "esp32-demo";

/// What to do with a reading for a sensor an existing chip does not have yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownSensorPolicy {
    /// Insert it, making ingestion a true upsert on (chip id, sensor id)
    Create,
    /// Fail with [`StoreError::SensorNotFound`] and roll the batch back
    Reject,
}

impl UnknownSensorPolicy {
    pub fn from_auto_create(auto_create: bool) -> Self {
        if auto_create {
            Self::Create
        } else {
            Self::Reject
        }
    }
}

/// Handle to the occupancy database
pub struct Store {
    conn: Mutex<Connection>,
    /// None for in-memory stores
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) a database file, or an in-memory one for `":memory:"`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path == Path::new(IN_MEMORY) {
            return Self::open_in_memory();
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database (tests, benchmarks, throwaway runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(path = ?path, "Store schema ready");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Database file path, None when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply a batch of readings from one chip
    ///
    /// Creates the chip (named after its id) with one sensor per reading when
    /// the chip is unknown. Otherwise rewrites the status of each addressed
    /// sensor, handling sensors the chip does not have according to `policy`.
    /// The whole batch commits or nothing does.
    pub fn reconcile(
        &self,
        chip_id: &str,
        readings: &[SensorReading],
        policy: UnknownSensorPolicy,
    ) -> StoreResult<ReconcileOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut outcome = ReconcileOutcome::default();

        let exists: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM chips WHERE id = ?1)",
            params![chip_id],
            |row| row.get(0),
        )?;

        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO sensors (chip_id, id, status) VALUES (?1, ?2, ?3)
                 ON CONFLICT (chip_id, id) DO UPDATE SET status = excluded.status",
            )?;

            if !exists {
                tx.execute(
                    "INSERT INTO chips (id, name) VALUES (?1, ?1) ON CONFLICT (id) DO NOTHING",
                    params![chip_id],
                )?;
                outcome.chip_created = true;

                for reading in readings {
                    insert.execute(params![chip_id, reading.id, reading.status])?;
                    outcome.sensors_created += 1;
                }
            } else {
                let mut update = tx.prepare_cached(
                    "UPDATE sensors SET status = ?3 WHERE chip_id = ?1 AND id = ?2",
                )?;

                for reading in readings {
                    if update.execute(params![chip_id, reading.id, reading.status])? > 0 {
                        outcome.sensors_updated += 1;
                        continue;
                    }

                    match policy {
                        UnknownSensorPolicy::Create => {
                            insert.execute(params![chip_id, reading.id, reading.status])?;
                            outcome.sensors_created += 1;
                        }
                        UnknownSensorPolicy::Reject => {
                            return Err(StoreError::SensorNotFound {
                                chip_id: chip_id.to_string(),
                                sensor_id: reading.id.clone(),
                            });
                        }
                    }
                }
            }
        }

        tx.commit()?;
        Ok(outcome)
    }

    /// Fetch one chip with its sensors in display order
    pub fn get_chip(&self, chip_id: &str) -> StoreResult<Option<Chip>> {
        let conn = self.lock()?;

        let chip = conn
            .prepare_cached("SELECT id, name FROM chips WHERE id = ?1")?
            .query_row(params![chip_id], |row| {
                Ok(Chip {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    sensors: Vec::new(),
                })
            })
            .optional()?;

        let Some(mut chip) = chip else {
            return Ok(None);
        };

        chip.sensors = conn
            .prepare_cached("SELECT chip_id, id, status FROM sensors WHERE chip_id = ?1")?
            .query_map(params![chip_id], sensor_from_row)?
            .collect::<Result<_, _>>()?;
        chip.sort_sensors();

        Ok(Some(chip))
    }

    /// All chips with their sensors, both in display order
    pub fn list_chips(&self) -> StoreResult<Vec<Chip>> {
        let conn = self.lock()?;

        let mut chips: Vec<Chip> = conn
            .prepare_cached("SELECT id, name FROM chips")?
            .query_map([], |row| {
                Ok(Chip {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    sensors: Vec::new(),
                })
            })?
            .collect::<Result<_, _>>()?;

        let mut by_chip: HashMap<String, Vec<Sensor>> = HashMap::new();
        let sensors: Vec<Sensor> = conn
            .prepare_cached("SELECT chip_id, id, status FROM sensors")?
            .query_map([], sensor_from_row)?
            .collect::<Result<_, _>>()?;
        for sensor in sensors {
            by_chip.entry(sensor.chip_id.clone()).or_default().push(sensor);
        }

        for chip in &mut chips {
            chip.sensors = by_chip.remove(&chip.id).unwrap_or_default();
            chip.sort_sensors();
        }
        chips.sort_by(|a, b| natural_cmp(&a.id, &b.id));

        Ok(chips)
    }

    /// Row counts
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.lock()?;
        let chips: i64 = conn.query_row("SELECT COUNT(*) FROM chips", [], |row| row.get(0))?;
        let sensors: i64 = conn.query_row("SELECT COUNT(*) FROM sensors", [], |row| row.get(0))?;

        Ok(StoreStats {
            chips: chips as usize,
            sensors: sensors as usize,
        })
    }

    /// Cheap round trip to check the database answers
    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Insert the demo table unless it already exists
    ///
    /// Returns true if the chip was created.
    pub fn seed_demo(&self) -> StoreResult<bool> {
        if self.get_chip(DEMO_CHIP_ID)?.is_some() {
            return Ok(false);
        }

        let outcome = self.reconcile(DEMO_CHIP_ID, &demo_readings(), UnknownSensorPolicy::Create)?;
        tracing::info!(chip_id = DEMO_CHIP_ID, sensors = outcome.sensors_created, "Seeded demo chip");
        Ok(outcome.chip_created)
    }

    /// Flush the write-ahead log back into the database file
    pub fn shutdown(&self) -> StoreResult<()> {
        if self.path.is_none() {
            return Ok(());
        }

        let conn = self.lock()?;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        tracing::info!(path = ?self.path, "Store checkpointed");
        Ok(())
    }
}

fn sensor_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sensor> {
    Ok(Sensor {
        chip_id: row.get(0)?,
        id: row.get(1)?,
        status: row.get(2)?,
    })
}

/// Readings of the demo table: two chairs taken, two free
pub fn demo_readings() -> Vec<SensorReading> {
    vec![
        SensorReading::new("chair-1", true),
        SensorReading::new("chair-2", false),
        SensorReading::new("chair-3", false),
        SensorReading::new("chair-4", true),
    ]
}
