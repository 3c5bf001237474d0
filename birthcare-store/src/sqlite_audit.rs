//! SQLite-based audit log of console actions
//!
//! Kept in its own file, apart from the discharge store.

use crate::error::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;

/// Mutating console actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ApproveApplication,
    RejectApplication,
    ResubmitFacility,
    UpdateFacility,
    UploadDocument,
    CreateAdmission,
    ChangeStatus,
    DischargeStep,
    SaveDocument,
    SaveBirthDetails,
    SaveScreening,
    CreatePrenatalVisit,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ApproveApplication => "approve_application",
            Action::RejectApplication => "reject_application",
            Action::ResubmitFacility => "resubmit_facility",
            Action::UpdateFacility => "update_facility",
            Action::UploadDocument => "upload_document",
            Action::CreateAdmission => "create_admission",
            Action::ChangeStatus => "change_status",
            Action::DischargeStep => "discharge_step",
            Action::SaveDocument => "save_document",
            Action::SaveBirthDetails => "save_birth_details",
            Action::SaveScreening => "save_screening",
            Action::CreatePrenatalVisit => "create_prenatal_visit",
        }
    }
}

/// One row of the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub detail: Option<String>,
    pub user_id: Option<String>,
    pub result: String,
    pub error_message: Option<String>,
}

pub struct AuditLog {
    conn: Connection,
}

#[allow(clippy::result_large_err)]
impl AuditLog {
    /// Open the audit log (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let audit = Self { conn };
        audit.initialize()?;
        Ok(audit)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL DEFAULT (datetime('now')),
                action TEXT NOT NULL,
                target_type TEXT,
                target_id TEXT,
                detail TEXT,
                user_id TEXT,
                client_ip TEXT,
                result TEXT NOT NULL,
                error_message TEXT
            )
            "#,
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_audit_target ON audit_log(target_type, target_id)",
            [],
        )?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log(
        &self,
        action: Action,
        target_type: Option<&str>,
        target_id: Option<&str>,
        detail: Option<&str>,
        user_id: Option<&str>,
        client_ip: Option<&str>,
        success: bool,
        error_message: Option<&str>,
    ) -> Result<()> {
        let result = if success { "success" } else { "error" };

        self.conn.execute(
            r#"
            INSERT INTO audit_log
            (action, target_type, target_id, detail, user_id, client_ip, result, error_message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                action.as_str(),
                target_type,
                target_id,
                detail,
                user_id,
                client_ip,
                result,
                error_message,
            ],
        )?;

        Ok(())
    }

    pub fn log_success(
        &self,
        action: Action,
        target_type: &str,
        target_id: &str,
        detail: Option<&str>,
        user_id: Option<&str>,
        client_ip: Option<&str>,
    ) -> Result<()> {
        self.log(
            action,
            Some(target_type),
            Some(target_id),
            detail,
            user_id,
            client_ip,
            true,
            None,
        )
    }

    pub fn log_error(
        &self,
        action: Action,
        target_type: Option<&str>,
        target_id: Option<&str>,
        user_id: Option<&str>,
        client_ip: Option<&str>,
        error: &str,
    ) -> Result<()> {
        self.log(
            action,
            target_type,
            target_id,
            None,
            user_id,
            client_ip,
            false,
            Some(error),
        )
    }

    /// Most recent entries first
    pub fn recent_entries(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, action, target_type, target_id, detail, user_id, result, error_message
            FROM audit_log
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AuditEntry {
                timestamp: row.get(0)?,
                action: row.get(1)?,
                target_type: row.get(2)?,
                target_id: row.get(3)?,
                detail: row.get(4)?,
                user_id: row.get(5)?,
                result: row.get(6)?,
                error_message: row.get(7)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log() {
        let audit = AuditLog::open(":memory:").unwrap();

        audit
            .log_success(
                Action::ApproveApplication,
                "application",
                "12",
                None,
                Some("admin@example.com"),
                Some("127.0.0.1"),
            )
            .unwrap();

        audit
            .log_error(
                Action::ChangeStatus,
                Some("admission"),
                Some("40"),
                None,
                Some("10.0.0.2"),
                "Upstream unavailable",
            )
            .unwrap();

        let count: i32 = audit
            .conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_recent_entries() {
        let audit = AuditLog::open(":memory:").unwrap();

        audit
            .log_success(Action::CreateAdmission, "admission", "1", None, None, None)
            .unwrap();
        audit
            .log_success(
                Action::DischargeStep,
                "admission",
                "1",
                Some("open_mother_slip"),
                None,
                None,
            )
            .unwrap();
        audit
            .log_error(Action::RejectApplication, Some("application"), Some("9"), None, None, "Reason required")
            .unwrap();

        let entries = audit.recent_entries(10).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].action, "reject_application");
        assert_eq!(entries[0].result, "error");
        assert_eq!(entries[0].error_message.as_deref(), Some("Reason required"));
        assert_eq!(entries[1].detail.as_deref(), Some("open_mother_slip"));

        assert_eq!(audit.recent_entries(1).unwrap().len(), 1);
    }
}
