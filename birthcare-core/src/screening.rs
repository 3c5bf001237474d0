//! Newborn screening checklist
//!
//! The test panel is a fixed list of six disorders in a fixed order.

use crate::error::{BirthcareError, Result};
use crate::models::Id;
use serde::{Deserialize, Serialize};

/// Disorders on the standard panel, in display order
pub const SCREENING_PANEL: [&str; 6] = [
    "Congenital Hypothyroidism",
    "Congenital Adrenal Hyperplasia",
    "Galactosemia",
    "Phenylketonuria",
    "G6PD Deficiency",
    "Maple Syrup Urine Disease",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningResult {
    #[default]
    Pending,
    Normal,
    Elevated,
    Positive,
}

impl ScreeningResult {
    pub fn is_abnormal(&self) -> bool {
        matches!(self, ScreeningResult::Elevated | ScreeningResult::Positive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningTestRow {
    pub disorder: String,
    #[serde(default)]
    pub result: ScreeningResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningChildInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub time_of_birth: Option<String>,
    #[serde(default)]
    pub birth_weight_grams: Option<u32>,
    #[serde(default)]
    pub gestational_age_weeks: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningMotherInfo {
    #[serde(default)]
    pub patient_id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCollection {
    #[serde(default)]
    pub collected_at: Option<String>,
    #[serde(default)]
    pub collected_by: Option<String>,
    #[serde(default)]
    pub sample_type: Option<String>,
    #[serde(default)]
    pub kit_number: Option<String>,
    #[serde(default)]
    pub sent_to_lab_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpAction {
    pub action: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewbornScreening {
    pub child: ScreeningChildInfo,
    pub mother: ScreeningMotherInfo,
    pub tests: Vec<ScreeningTestRow>,
    #[serde(default)]
    pub sample: SampleCollection,
    #[serde(default)]
    pub follow_up: Vec<FollowUpAction>,
}

impl NewbornScreening {
    /// New checklist with all six panel rows pending
    pub fn new(child: ScreeningChildInfo, mother: ScreeningMotherInfo) -> Self {
        Self {
            child,
            mother,
            tests: SCREENING_PANEL
                .iter()
                .map(|disorder| ScreeningTestRow {
                    disorder: disorder.to_string(),
                    result: ScreeningResult::Pending,
                    remarks: None,
                })
                .collect(),
            sample: SampleCollection::default(),
            follow_up: Vec::new(),
        }
    }

    /// Set the result of one panel row by disorder name
    pub fn record_result(&mut self, disorder: &str, result: ScreeningResult) -> Result<()> {
        let row = self
            .tests
            .iter_mut()
            .find(|r| r.disorder == disorder)
            .ok_or_else(|| BirthcareError::validation(format!("Unknown screening test: {}", disorder)))?;
        row.result = result;
        Ok(())
    }

    /// The panel must be exactly the six fixed rows in order
    pub fn validate(&self) -> Result<()> {
        if self.tests.len() != SCREENING_PANEL.len() {
            return Err(BirthcareError::validation(format!(
                "Screening panel must have {} tests, found {}",
                SCREENING_PANEL.len(),
                self.tests.len()
            )));
        }
        for (row, expected) in self.tests.iter().zip(SCREENING_PANEL) {
            if row.disorder != expected {
                return Err(BirthcareError::validation(format!(
                    "Unexpected screening test '{}', expected '{}'",
                    row.disorder, expected
                )));
            }
        }
        if self.child.name.trim().is_empty() {
            return Err(BirthcareError::validation("Child name is required"));
        }
        Ok(())
    }

    pub fn abnormal_tests(&self) -> Vec<&ScreeningTestRow> {
        self.tests.iter().filter(|r| r.result.is_abnormal()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.tests.iter().all(|r| r.result != ScreeningResult::Pending)
    }
}
