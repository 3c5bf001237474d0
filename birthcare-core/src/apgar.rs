//! APGAR scoring
//!
//! Five categories scored 0..=2, assessed at one and five minutes after birth.

use crate::error::{BirthcareError, Result};
use serde::{Deserialize, Serialize};

/// Highest score of a single category
pub const MAX_CATEGORY_SCORE: u8 = 2;

/// Scores of one timepoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApgarScore {
    #[serde(default)]
    pub appearance: u8,
    #[serde(default)]
    pub pulse: u8,
    #[serde(default)]
    pub grimace: u8,
    #[serde(default)]
    pub activity: u8,
    #[serde(default)]
    pub respiration: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApgarInterpretation {
    Normal,
    ResuscitationMayBeNeeded,
    ImmediateResuscitation,
}

impl ApgarInterpretation {
    pub fn from_total(total: u16) -> Self {
        match total {
            7.. => ApgarInterpretation::Normal,
            4..=6 => ApgarInterpretation::ResuscitationMayBeNeeded,
            _ => ApgarInterpretation::ImmediateResuscitation,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApgarInterpretation::Normal => "Normal",
            ApgarInterpretation::ResuscitationMayBeNeeded => {
                "Might require some resuscitative measures"
            }
            ApgarInterpretation::ImmediateResuscitation => "Immediate Resuscitation",
        }
    }
}

impl ApgarScore {
    /// Build a score, rejecting any category above 2
    pub fn new(appearance: u8, pulse: u8, grimace: u8, activity: u8, respiration: u8) -> Result<Self> {
        let score = Self {
            appearance,
            pulse,
            grimace,
            activity,
            respiration,
        };
        score.validate()?;
        Ok(score)
    }

    fn categories(&self) -> [(&'static str, u8); 5] {
        [
            ("appearance", self.appearance),
            ("pulse", self.pulse),
            ("grimace", self.grimace),
            ("activity", self.activity),
            ("respiration", self.respiration),
        ]
    }

    /// Report the first category outside 0..=2
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.categories() {
            if value > MAX_CATEGORY_SCORE {
                return Err(BirthcareError::validation(format!(
                    "APGAR {} score must be between 0 and {}, got {}",
                    name, MAX_CATEGORY_SCORE, value
                )));
            }
        }
        Ok(())
    }

    /// Plain sum of the five categories
    pub fn total(&self) -> u16 {
        self.categories().iter().map(|(_, v)| u16::from(*v)).sum()
    }

    pub fn interpret(&self) -> ApgarInterpretation {
        ApgarInterpretation::from_total(self.total())
    }
}

/// Both timepoints with their computed totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApgarAssessment {
    pub one_minute: ApgarScore,
    pub five_minutes: ApgarScore,
    pub one_minute_total: u16,
    pub five_minutes_total: u16,
    pub one_minute_interpretation: ApgarInterpretation,
    pub five_minutes_interpretation: ApgarInterpretation,
}

impl ApgarAssessment {
    pub fn new(one_minute: ApgarScore, five_minutes: ApgarScore) -> Self {
        Self {
            one_minute,
            five_minutes,
            one_minute_total: one_minute.total(),
            five_minutes_total: five_minutes.total(),
            one_minute_interpretation: one_minute.interpret(),
            five_minutes_interpretation: five_minutes.interpret(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_sum_of_categories() {
        let score = ApgarScore::new(1, 2, 1, 2, 2).unwrap();
        assert_eq!(score.total(), 8);
        assert_eq!(ApgarScore::default().total(), 0);
        assert_eq!(ApgarScore::new(2, 2, 2, 2, 2).unwrap().total(), 10);
    }

    #[test]
    fn test_total_of_unvalidated_scores_is_not_capped() {
        let parsed: ApgarScore = serde_json::from_str(
            r#"{"appearance":200,"pulse":200,"grimace":200,"activity":200,"respiration":200}"#,
        )
        .unwrap();
        assert_eq!(parsed.total(), 1000);
        assert_eq!(parsed.interpret(), ApgarInterpretation::Normal);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(ApgarInterpretation::from_total(10), ApgarInterpretation::Normal);
        assert_eq!(ApgarInterpretation::from_total(7), ApgarInterpretation::Normal);
        assert_eq!(
            ApgarInterpretation::from_total(6),
            ApgarInterpretation::ResuscitationMayBeNeeded
        );
        assert_eq!(
            ApgarInterpretation::from_total(4),
            ApgarInterpretation::ResuscitationMayBeNeeded
        );
        assert_eq!(
            ApgarInterpretation::from_total(3),
            ApgarInterpretation::ImmediateResuscitation
        );
        assert_eq!(
            ApgarInterpretation::from_total(0),
            ApgarInterpretation::ImmediateResuscitation
        );
    }

    #[test]
    fn test_labels() {
        let low = ApgarScore::new(0, 1, 0, 1, 1).unwrap();
        assert_eq!(low.interpret().label(), "Immediate Resuscitation");
        let mid = ApgarScore::new(1, 1, 1, 1, 1).unwrap();
        assert_eq!(mid.interpret().label(), "Might require some resuscitative measures");
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(ApgarScore::new(3, 0, 0, 0, 0).is_err());
        let parsed: ApgarScore =
            serde_json::from_str(r#"{"appearance":1,"pulse":5}"#).unwrap();
        let err = parsed.validate().unwrap_err().to_string();
        assert!(err.contains("pulse"));
    }

    #[test]
    fn test_assessment_computes_both_timepoints() {
        let assessment = ApgarAssessment::new(
            ApgarScore::new(1, 1, 1, 1, 1).unwrap(),
            ApgarScore::new(2, 2, 1, 2, 2).unwrap(),
        );
        assert_eq!(assessment.one_minute_total, 5);
        assert_eq!(assessment.five_minutes_total, 9);
        assert_eq!(
            assessment.five_minutes_interpretation,
            ApgarInterpretation::Normal
        );
    }
}
