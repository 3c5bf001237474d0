//! Birth details form for one delivery with one or more live births

use crate::apgar::{ApgarAssessment, ApgarScore};
use crate::error::{BirthcareError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plurality {
    #[default]
    Single,
    Twin,
    Triplet,
    /// Count controlled by explicit add/remove
    Multiple,
}

impl Plurality {
    /// Fixed baby count, `None` for `Multiple`
    pub fn baby_count(&self) -> Option<usize> {
        match self {
            Plurality::Single => Some(1),
            Plurality::Twin => Some(2),
            Plurality::Triplet => Some(3),
            Plurality::Multiple => None,
        }
    }
}

/// Fields shared by every baby of the delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedBirthFields {
    #[serde(default)]
    pub date_of_delivery: String,
    #[serde(default)]
    pub time_of_delivery: String,
    #[serde(default)]
    pub place_of_delivery: String,
    #[serde(default)]
    pub attendant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_delivery: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BabyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_circumference_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest_circumference_cm: Option<f64>,
    #[serde(default)]
    pub apgar_one_minute: ApgarScore,
    #[serde(default)]
    pub apgar_five_minutes: ApgarScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// One baby merged with the shared delivery fields, ready to be saved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BabyBirthRecord {
    /// 1-based position within the delivery
    pub birth_order: usize,
    pub baby_count: usize,
    pub plurality: Plurality,
    #[serde(flatten)]
    pub shared: SharedBirthFields,
    #[serde(flatten)]
    pub baby: BabyDetails,
    pub apgar: ApgarAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthDetailsForm {
    #[serde(default)]
    pub shared: SharedBirthFields,
    #[serde(default)]
    pub plurality: Plurality,
    #[serde(default = "one_blank_baby")]
    pub babies: Vec<BabyDetails>,
}

fn one_blank_baby() -> Vec<BabyDetails> {
    vec![BabyDetails::default()]
}

impl Default for BirthDetailsForm {
    fn default() -> Self {
        Self {
            shared: SharedBirthFields::default(),
            plurality: Plurality::Single,
            babies: one_blank_baby(),
        }
    }
}

impl BirthDetailsForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize the baby list to match a fixed plurality.
    ///
    /// Entries below the new count are kept as entered.
    pub fn set_plurality(&mut self, plurality: Plurality) {
        self.plurality = plurality;
        if let Some(count) = plurality.baby_count() {
            if count < self.babies.len() {
                tracing::debug!(
                    from = self.babies.len(),
                    to = count,
                    "Truncating baby entries"
                );
            }
            self.babies.resize_with(count, BabyDetails::default);
        }
    }

    pub fn add_baby(&mut self) {
        self.babies.push(BabyDetails::default());
    }

    pub fn can_remove_baby(&self) -> bool {
        self.babies.len() > 1
    }

    pub fn remove_baby(&mut self, index: usize) -> Result<BabyDetails> {
        if !self.can_remove_baby() {
            return Err(BirthcareError::validation("At least one baby is required"));
        }
        if index >= self.babies.len() {
            return Err(BirthcareError::validation(format!(
                "No baby at position {}",
                index + 1
            )));
        }
        Ok(self.babies.remove(index))
    }

    /// Check that the baby entries match the plurality
    pub fn check_baby_count(&self) -> Result<()> {
        if self.babies.is_empty() {
            return Err(BirthcareError::validation("At least one baby is required"));
        }
        if let Some(expected) = self.plurality.baby_count()
            && expected != self.babies.len()
        {
            return Err(BirthcareError::validation(format!(
                "{:?} delivery requires {} baby entries, found {}",
                self.plurality,
                expected,
                self.babies.len()
            )));
        }
        Ok(())
    }

    /// Report missing or out-of-range entries. Saving does not require this.
    pub fn validate(&self) -> Result<()> {
        self.check_baby_count()?;
        if self.shared.date_of_delivery.trim().is_empty() {
            return Err(BirthcareError::validation("Date of delivery is required"));
        }
        for (i, baby) in self.babies.iter().enumerate() {
            baby.apgar_one_minute.validate().map_err(|e| prefix_baby(i, e))?;
            baby.apgar_five_minutes.validate().map_err(|e| prefix_baby(i, e))?;
        }
        Ok(())
    }

    /// Merge every baby with the shared fields and compute APGAR totals
    pub fn records(&self) -> Vec<BabyBirthRecord> {
        let baby_count = self.babies.len();
        self.babies
            .iter()
            .enumerate()
            .map(|(i, baby)| BabyBirthRecord {
                birth_order: i + 1,
                baby_count,
                plurality: self.plurality,
                shared: self.shared.clone(),
                baby: baby.clone(),
                apgar: ApgarAssessment::new(baby.apgar_one_minute, baby.apgar_five_minutes),
            })
            .collect()
    }

    /// Back to a single blank baby
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn prefix_baby(index: usize, err: BirthcareError) -> BirthcareError {
    match err {
        BirthcareError::Validation { message } => {
            BirthcareError::validation(format!("Baby {}: {}", index + 1, message))
        }
        other => other,
    }
}

/// Success text shown after every baby was saved
pub fn saved_message(baby_count: usize) -> String {
    if baby_count == 1 {
        "Birth details saved for 1 baby".to_string()
    } else {
        format!("Birth details saved for {} babies", baby_count)
    }
}
