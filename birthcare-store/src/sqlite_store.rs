//! SQLite-backed discharge workflow store
//!
//! Schema:
//!   - discharge_progress: one row per admission (admission_id, patient_id, stage, updated_at)

use crate::discharge_store::DischargeStore;
use crate::error::{Result, StoreError};
use birthcare_core::{models::Id, DischargeProgress, DischargeStage};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteDischargeStore {
    conn: Mutex<Connection>,
}

#[allow(clippy::result_large_err)]
impl SqliteDischargeStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for read-write concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS discharge_progress (
                admission_id INTEGER PRIMARY KEY,
                patient_id INTEGER NOT NULL,
                stage TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_discharge_stage ON discharge_progress(stage)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of admissions per stage
    pub fn count_by_stage(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT stage, COUNT(*) FROM discharge_progress GROUP BY stage ORDER BY stage",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

type RawProgress = (i64, i64, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawProgress> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode((admission_id, patient_id, stage, updated_at): RawProgress) -> Result<DischargeProgress> {
    let stage = DischargeStage::parse(&stage).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map_err(|e| StoreError::Corrupt(format!("updated_at: {}", e)))?
        .with_timezone(&Utc);
    Ok(DischargeProgress {
        admission_id: admission_id as Id,
        patient_id: patient_id as Id,
        stage,
        updated_at,
    })
}

#[allow(clippy::result_large_err)]
impl DischargeStore for SqliteDischargeStore {
    fn get(&self, admission_id: Id) -> Result<Option<DischargeProgress>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                "SELECT admission_id, patient_id, stage, updated_at
                 FROM discharge_progress WHERE admission_id = ?",
                params![admission_id as i64],
                read_row,
            )
            .optional()?;
        raw.map(decode).transpose()
    }

    fn put(&self, progress: &DischargeProgress) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO discharge_progress (admission_id, patient_id, stage, updated_at)
             VALUES (?, ?, ?, ?)",
            params![
                progress.admission_id as i64,
                progress.patient_id as i64,
                progress.stage.as_str(),
                progress.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn remove(&self, admission_id: Id) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "DELETE FROM discharge_progress WHERE admission_id = ?",
            params![admission_id as i64],
        )?;
        Ok(rows > 0)
    }

    fn list(&self) -> Result<Vec<DischargeProgress>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT admission_id, patient_id, stage, updated_at
             FROM discharge_progress ORDER BY admission_id",
        )?;
        let rows = stmt.query_map([], read_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(decode(row?)?);
        }
        Ok(records)
    }
}
