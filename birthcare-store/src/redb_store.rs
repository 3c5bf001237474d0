//! ReDB-backed discharge workflow store
//!
//! Key: admission id. Value: JSON-encoded `DischargeProgress`.

use crate::discharge_store::DischargeStore;
use crate::error::Result;
use birthcare_core::{models::Id, DischargeProgress};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

const DISCHARGE: TableDefinition<u64, &[u8]> = TableDefinition::new("discharge_progress");

pub struct RedbDischargeStore {
    db: Database,
}

#[allow(clippy::result_large_err)]
impl RedbDischargeStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path)?;

        // Initialize table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DISCHARGE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

#[allow(clippy::result_large_err)]
impl DischargeStore for RedbDischargeStore {
    fn get(&self, admission_id: Id) -> Result<Option<DischargeProgress>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DISCHARGE)?;

        match table.get(admission_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put(&self, progress: &DischargeProgress) -> Result<()> {
        let data = serde_json::to_vec(progress)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DISCHARGE)?;
            table.insert(progress.admission_id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, admission_id: Id) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(DISCHARGE)?;
            table.remove(admission_id)?.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<DischargeProgress>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DISCHARGE)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }
}
