//! Rejection dialog of the application review screen

use crate::error::{BirthcareError, Result};

/// State of the "reject application" dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionDialog {
    pub open: bool,
    pub reason: String,
    pub error: Option<String>,
    pub submitting: bool,
}

/// A reason counts only if it has visible text
pub fn is_valid_reason(reason: &str) -> bool {
    !reason.trim().is_empty()
}

impl RejectionDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    /// Confirm button state
    pub fn can_confirm(&self) -> bool {
        self.open && !self.submitting && is_valid_reason(&self.reason)
    }

    /// Start submitting; returns the trimmed reason to send
    pub fn begin_submit(&mut self) -> Result<String> {
        if !self.can_confirm() {
            return Err(BirthcareError::validation("A rejection reason is required"));
        }
        self.submitting = true;
        self.error = None;
        Ok(self.reason.trim().to_string())
    }

    /// Submission failed: stay open, keep the entered reason
    pub fn fail(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.open = true;
        self.error = Some(message.into());
    }

    pub fn succeed(&mut self) {
        *self = Self::default();
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}
