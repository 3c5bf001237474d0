pub mod discharge_store;
pub mod error;
pub mod redb_store;
pub mod sqlite_audit;
pub mod sqlite_store;

pub use discharge_store::DischargeStore;
pub use error::{Result, StoreError};
pub use redb_store::RedbDischargeStore;
pub use sqlite_audit::{Action, AuditEntry, AuditLog};
pub use sqlite_store::SqliteDischargeStore;
