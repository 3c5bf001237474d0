//! Closed status types
//!
//! The backend speaks strings (`in-labor`, `pending`, ...). Every call site
//! matches on these enums instead.

use crate::error::BirthcareError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a patient admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionStatus {
    InLabor,
    Delivered,
    Discharged,
}

impl AdmissionStatus {
    pub const ALL: [AdmissionStatus; 3] = [
        AdmissionStatus::InLabor,
        AdmissionStatus::Delivered,
        AdmissionStatus::Discharged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::InLabor => "in-labor",
            AdmissionStatus::Delivered => "delivered",
            AdmissionStatus::Discharged => "discharged",
        }
    }

    /// Label shown in admission tables
    pub fn label(&self) -> &'static str {
        match self {
            AdmissionStatus::InLabor => "In Labor",
            AdmissionStatus::Delivered => "Delivered",
            AdmissionStatus::Discharged => "Discharged",
        }
    }

    /// Discharge is gated behind the two discharge slips.
    pub fn is_gated(&self) -> bool {
        matches!(self, AdmissionStatus::Discharged)
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionStatus {
    type Err = BirthcareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-labor" => Ok(AdmissionStatus::InLabor),
            "delivered" => Ok(AdmissionStatus::Delivered),
            "discharged" => Ok(AdmissionStatus::Discharged),
            other => Err(BirthcareError::UnknownStatus {
                kind: "admission",
                value: other.to_string(),
            }),
        }
    }
}

/// Review status of a facility application (also used for the facility itself)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Only rejected facilities can be resubmitted for review
    pub fn can_resubmit(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected)
    }

    /// Only pending applications await a decision
    pub fn awaits_decision(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = BirthcareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(BirthcareError::UnknownStatus {
                kind: "application",
                value: other.to_string(),
            }),
        }
    }
}

/// Admin decision on a pending application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    /// Path segment of the decision endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            ApprovalDecision::Approve => "approve",
            ApprovalDecision::Reject => "reject",
        }
    }

    pub fn resulting_status(&self) -> ApplicationStatus {
        match self {
            ApprovalDecision::Approve => ApplicationStatus::Approved,
            ApprovalDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}
