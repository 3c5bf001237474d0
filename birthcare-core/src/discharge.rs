//! Discharge workflow
//!
//! An admission may only become `discharged` after the mother slip and then
//! the newborn slip have been opened. The stage is kept per admission and
//! persisted by the console service, so leaving the page does not restart
//! the sequence.

use crate::error::{BirthcareError, Result};
use crate::models::Id;
use crate::status::AdmissionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DischargeStage {
    #[default]
    NotStarted,
    MotherSlipCreated,
    NewbornSlipCreated,
    Discharged,
}

impl DischargeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DischargeStage::NotStarted => "not_started",
            DischargeStage::MotherSlipCreated => "mother_slip_created",
            DischargeStage::NewbornSlipCreated => "newborn_slip_created",
            DischargeStage::Discharged => "discharged",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "not_started" => Ok(DischargeStage::NotStarted),
            "mother_slip_created" => Ok(DischargeStage::MotherSlipCreated),
            "newborn_slip_created" => Ok(DischargeStage::NewbornSlipCreated),
            "discharged" => Ok(DischargeStage::Discharged),
            other => Err(BirthcareError::UnknownStatus {
                kind: "discharge stage",
                value: other.to_string(),
            }),
        }
    }
}

/// Persisted workflow state of one admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeProgress {
    pub admission_id: Id,
    pub patient_id: Id,
    pub stage: DischargeStage,
    pub updated_at: DateTime<Utc>,
}

impl DischargeProgress {
    pub fn new(admission_id: Id, patient_id: Id) -> Self {
        Self {
            admission_id,
            patient_id,
            stage: DischargeStage::NotStarted,
            updated_at: Utc::now(),
        }
    }

    /// Mother discharge slip has been opened in the current cycle
    pub fn mother(&self) -> bool {
        matches!(
            self.stage,
            DischargeStage::MotherSlipCreated | DischargeStage::NewbornSlipCreated
        )
    }

    /// Newborn discharge slip has been opened in the current cycle
    pub fn newborn(&self) -> bool {
        self.stage == DischargeStage::NewbornSlipCreated
    }

    fn moved_to(&self, stage: DischargeStage) -> Self {
        Self {
            stage,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Builds the discharge slip locations opened for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DischargeRoutes {
    prefix: String,
}

impl Default for DischargeRoutes {
    fn default() -> Self {
        Self::new("/birthcare")
    }
}

impl DischargeRoutes {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn mother_slip(&self, birthcare_id: Id, patient_id: Id, admission_id: Id) -> String {
        self.slip("mother-discharge", birthcare_id, patient_id, admission_id)
    }

    pub fn newborn_slip(&self, birthcare_id: Id, patient_id: Id, admission_id: Id) -> String {
        self.slip("newborn-discharge", birthcare_id, patient_id, admission_id)
    }

    fn slip(&self, form: &str, birthcare_id: Id, patient_id: Id, admission_id: Id) -> String {
        format!(
            "{}/{}/{}?patientId={}&admissionId={}",
            self.prefix, birthcare_id, form, patient_id, admission_id
        )
    }
}

/// What the caller must do after selecting "discharged"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DischargeStep {
    /// Open the mother slip; no status update yet
    OpenMotherSlip { open_url: String },
    /// Open the newborn slip and issue the discharge status update
    OpenNewbornSlipAndDischarge { open_url: String },
    /// Both slips were opened already, or the admission is discharged.
    /// Nothing is sent.
    AlreadyDischarged,
}

impl DischargeStep {
    /// Wire name, as in the `action` tag
    pub fn action(&self) -> &'static str {
        match self {
            DischargeStep::OpenMotherSlip { .. } => "open_mother_slip",
            DischargeStep::OpenNewbornSlipAndDischarge { .. } => "open_newborn_slip_and_discharge",
            DischargeStep::AlreadyDischarged => "already_discharged",
        }
    }

    /// Only these steps send the status update upstream
    pub fn issues_status_update(&self) -> bool {
        matches!(self, DischargeStep::OpenNewbornSlipAndDischarge { .. })
    }

    pub fn open_url(&self) -> Option<&str> {
        match self {
            DischargeStep::OpenMotherSlip { open_url }
            | DischargeStep::OpenNewbornSlipAndDischarge { open_url } => Some(open_url),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DischargeStep::OpenMotherSlip { .. } => {
                "Mother discharge slip opened. Select discharged again for the newborn slip."
            }
            DischargeStep::OpenNewbornSlipAndDischarge { .. } => {
                "Newborn discharge slip opened. Discharging patient."
            }
            DischargeStep::AlreadyDischarged => "Patient is already discharged.",
        }
    }
}

/// Central transition rules of the discharge workflow
#[derive(Debug, Clone, Default)]
pub struct DischargeWorkflow {
    routes: DischargeRoutes,
}

impl DischargeWorkflow {
    pub fn new(routes: DischargeRoutes) -> Self {
        Self { routes }
    }

    /// Advance on a "discharged" selection.
    ///
    /// `current_status` is the admission's confirmed status when the caller
    /// knows it; an already discharged row never advances.
    pub fn advance(
        &self,
        birthcare_id: Id,
        progress: &DischargeProgress,
        current_status: Option<AdmissionStatus>,
    ) -> (DischargeProgress, DischargeStep) {
        if current_status == Some(AdmissionStatus::Discharged) {
            return (
                progress.moved_to(DischargeStage::Discharged),
                DischargeStep::AlreadyDischarged,
            );
        }

        let (patient_id, admission_id) = (progress.patient_id, progress.admission_id);
        tracing::debug!(
            admission_id,
            stage = progress.stage.as_str(),
            "Advancing discharge workflow"
        );
        match progress.stage {
            DischargeStage::NotStarted => (
                progress.moved_to(DischargeStage::MotherSlipCreated),
                DischargeStep::OpenMotherSlip {
                    open_url: self.routes.mother_slip(birthcare_id, patient_id, admission_id),
                },
            ),
            DischargeStage::MotherSlipCreated => (
                progress.moved_to(DischargeStage::NewbornSlipCreated),
                DischargeStep::OpenNewbornSlipAndDischarge {
                    open_url: self.routes.newborn_slip(birthcare_id, patient_id, admission_id),
                },
            ),
            // The status update was issued on the second selection, whatever its outcome
            DischargeStage::NewbornSlipCreated | DischargeStage::Discharged => {
                (progress.clone(), DischargeStep::AlreadyDischarged)
            }
        }
    }

    /// Record the outcome of the discharge status update
    pub fn complete(&self, progress: &DischargeProgress) -> Result<DischargeProgress> {
        if progress.stage != DischargeStage::NewbornSlipCreated {
            return Err(BirthcareError::InvalidTransition(format!(
                "admission {} cannot be discharged from stage {}",
                progress.admission_id,
                progress.stage.as_str()
            )));
        }
        Ok(progress.moved_to(DischargeStage::Discharged))
    }

    /// A direct change away from `discharged` restarts the sequence
    pub fn after_direct_change(
        &self,
        progress: &DischargeProgress,
        status: AdmissionStatus,
    ) -> Option<DischargeProgress> {
        (progress.stage == DischargeStage::Discharged && status != AdmissionStatus::Discharged)
            .then(|| progress.moved_to(DischargeStage::NotStarted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> DischargeWorkflow {
        DischargeWorkflow::default()
    }

    #[test]
    fn test_first_selection_opens_mother_slip() {
        let progress = DischargeProgress::new(12, 5);
        let (next, step) = workflow().advance(1, &progress, Some(AdmissionStatus::Delivered));
        assert_eq!(next.stage, DischargeStage::MotherSlipCreated);
        assert!(next.mother());
        assert!(!next.newborn());
        assert_eq!(
            step.open_url(),
            Some("/birthcare/1/mother-discharge?patientId=5&admissionId=12")
        );
        assert!(!step.issues_status_update());
    }

    #[test]
    fn test_second_selection_opens_newborn_slip_and_discharges() {
        let wf = workflow();
        let progress = DischargeProgress::new(12, 5);
        let (progress, _) = wf.advance(1, &progress, None);
        let (progress, step) = wf.advance(1, &progress, None);
        assert_eq!(progress.stage, DischargeStage::NewbornSlipCreated);
        assert!(progress.newborn());
        assert!(step.issues_status_update());
        assert_eq!(
            step.open_url(),
            Some("/birthcare/1/newborn-discharge?patientId=5&admissionId=12")
        );

        let done = wf.complete(&progress).unwrap();
        assert_eq!(done.stage, DischargeStage::Discharged);
        assert!(!done.mother());
        assert!(!done.newborn());
    }

    #[test]
    fn test_third_selection_is_noop() {
        let wf = workflow();
        let mut progress = DischargeProgress::new(12, 5);
        progress.stage = DischargeStage::Discharged;
        let (next, step) = wf.advance(1, &progress, None);
        assert_eq!(step, DischargeStep::AlreadyDischarged);
        assert_eq!(next, progress);
        assert_eq!(step.message(), "Patient is already discharged.");
    }

    #[test]
    fn test_row_already_discharged_is_noop() {
        let progress = DischargeProgress::new(3, 4);
        let (next, step) = workflow().advance(1, &progress, Some(AdmissionStatus::Discharged));
        assert_eq!(step, DischargeStep::AlreadyDischarged);
        assert_eq!(next.stage, DischargeStage::Discharged);
        assert!(step.open_url().is_none());
    }

    #[test]
    fn test_selection_after_second_sends_nothing() {
        // Update in flight or already failed: both slips exist
        let mut progress = DischargeProgress::new(3, 4);
        progress.stage = DischargeStage::NewbornSlipCreated;
        let (next, step) = workflow().advance(1, &progress, Some(AdmissionStatus::Delivered));
        assert_eq!(step, DischargeStep::AlreadyDischarged);
        assert!(!step.issues_status_update());
        assert!(step.open_url().is_none());
        assert_eq!(next, progress);
    }

    #[test]
    fn test_complete_requires_both_slips() {
        let progress = DischargeProgress::new(3, 4);
        assert!(workflow().complete(&progress).is_err());
    }

    #[test]
    fn test_direct_change_restarts_after_discharge() {
        let wf = workflow();
        let mut progress = DischargeProgress::new(3, 4);
        progress.stage = DischargeStage::Discharged;
        let reset = wf.after_direct_change(&progress, AdmissionStatus::InLabor).unwrap();
        assert_eq!(reset.stage, DischargeStage::NotStarted);

        progress.stage = DischargeStage::MotherSlipCreated;
        assert!(wf.after_direct_change(&progress, AdmissionStatus::Delivered).is_none());
    }

    #[test]
    fn test_custom_route_prefix() {
        let routes = DischargeRoutes::new("/facility/");
        assert_eq!(
            routes.mother_slip(2, 9, 10),
            "/facility/2/mother-discharge?patientId=9&admissionId=10"
        );
    }

    #[test]
    fn test_stage_round_trip_names() {
        for stage in [
            DischargeStage::NotStarted,
            DischargeStage::MotherSlipCreated,
            DischargeStage::NewbornSlipCreated,
            DischargeStage::Discharged,
        ] {
            assert_eq!(DischargeStage::parse(stage.as_str()).unwrap(), stage);
        }
        assert!(DischargeStage::parse("halfway").is_err());
    }

    #[test]
    fn test_step_serializes_with_action_tag() {
        let step = DischargeStep::OpenMotherSlip {
            open_url: "/x".to_string(),
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["action"], "open_mother_slip");
        assert_eq!(value["open_url"], "/x");
        assert_eq!(value["action"], step.action());
        assert_eq!(
            serde_json::to_value(DischargeStep::AlreadyDischarged).unwrap()["action"],
            DischargeStep::AlreadyDischarged.action()
        );
    }
}
