//! Backend-owned records as consumed by the console
//!
//! Every entity is created and mutated through the remote API. These types
//! only describe the fields the console reads or submits.

use crate::status::{AdmissionStatus, ApplicationStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Backend primary key
pub type Id = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityDocument {
    pub id: Id,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Facility registration awaiting admin review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthcareApplication {
    pub id: Id,
    pub name: String,
    pub status: ApplicationStatus,
    pub user: ApplicantUser,
    #[serde(default)]
    pub documents: Vec<FacilityDocument>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Facility profile as seen by its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Birthcare {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub documents: Vec<FacilityDocument>,
}

/// Owner-editable subset of [`Birthcare`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BirthcareUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Id,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub philhealth_number: Option<String>,
    #[serde(default)]
    pub philhealth_category: Option<String>,
}

impl Patient {
    /// "First Middle Last", skipping a blank middle name
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bed {
    pub id: Id,
    pub bed_number: String,
    #[serde(default)]
    pub is_occupied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAdmission {
    pub id: Id,
    pub patient_id: Id,
    #[serde(default)]
    pub patient: Option<Patient>,
    #[serde(default)]
    pub room: Option<Room>,
    #[serde(default)]
    pub bed: Option<Bed>,
    pub status: AdmissionStatus,
    #[serde(default)]
    pub attending_physician: Option<StaffMember>,
    #[serde(default)]
    pub primary_nurse: Option<StaffMember>,
    #[serde(default)]
    pub admission_date: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
}

/// Admission intake form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAdmission {
    pub patient_id: Id,
    pub room_id: Id,
    pub bed_id: Id,
    pub admission_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attending_physician_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_nurse_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(default = "default_admission_status")]
    pub status: AdmissionStatus,
}

fn default_admission_status() -> AdmissionStatus {
    AdmissionStatus::InLabor
}

impl NewAdmission {
    /// Intake requires a patient, a room and a bed; the backend re-validates.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patient_id == 0 {
            missing.push("patient_id");
        }
        if self.room_id == 0 {
            missing.push("room_id");
        }
        if self.bed_id == 0 {
            missing.push("bed_id");
        }
        if self.admission_date.trim().is_empty() {
            missing.push("admission_date");
        }
        missing
    }
}

/// Aggregate metrics for the facility dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    #[serde(default)]
    pub total_patients: u64,
    #[serde(default)]
    pub active_admissions: u64,
    #[serde(default)]
    pub births_this_month: u64,
    #[serde(default)]
    pub available_beds: u64,
    #[serde(default)]
    pub total_beds: u64,
    #[serde(default)]
    pub pending_prenatal_visits: u64,
    /// Metrics this console does not know about, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DashboardStatistics {
    /// Occupied share of beds in percent, `None` when the facility has no beds
    pub fn occupancy_percent(&self) -> Option<f64> {
        if self.total_beds == 0 {
            return None;
        }
        let occupied = self.total_beds.saturating_sub(self.available_beds);
        Some(occupied as f64 * 100.0 / self.total_beds as f64)
    }
}

/// One row of a patient's prenatal visit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrenatalVisit {
    pub id: Id,
    pub patient_id: Id,
    pub visit_date: String,
    #[serde(default)]
    pub gestational_age_weeks: Option<u8>,
    #[serde(default)]
    pub blood_pressure: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub fundal_height_cm: Option<f64>,
    #[serde(default)]
    pub fetal_heart_rate: Option<u16>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub patient: Option<Patient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrenatalVisit {
    pub patient_id: Id,
    pub visit_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gestational_age_weeks: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundal_height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetal_heart_rate: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A generated document to be stored against a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatientDocument {
    pub patient_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_id: Option<Id>,
    pub title: String,
    pub document_type: String,
    pub content_type: String,
    /// Base64 encoded body
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDocument {
    pub id: Id,
    pub patient_id: Id,
    pub title: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
