//! Durable discharge workflow state, keyed by admission id

use crate::error::Result;
use birthcare_core::{models::Id, DischargeProgress};

/// Backend-agnostic access to persisted discharge progress
pub trait DischargeStore: Send + Sync {
    fn get(&self, admission_id: Id) -> Result<Option<DischargeProgress>>;

    /// Insert or replace the progress of one admission
    fn put(&self, progress: &DischargeProgress) -> Result<()>;

    /// Returns true if a record was removed
    fn remove(&self, admission_id: Id) -> Result<bool>;

    /// All records, ordered by admission id
    fn list(&self) -> Result<Vec<DischargeProgress>>;

    /// Progress of an admission, or a fresh record when none is stored
    fn get_or_new(&self, admission_id: Id, patient_id: Id) -> Result<DischargeProgress> {
        Ok(self
            .get(admission_id)?
            .unwrap_or_else(|| DischargeProgress::new(admission_id, patient_id)))
    }
}
