//! birthcare-core - domain model for the birthcare console
//!
//! Closed status types, clinical calculators and the workflow/form state
//! machines shared by the HTTP client and the console service.

pub mod apgar;
pub mod approval;
pub mod billing;
pub mod birth_details;
pub mod discharge;
pub mod error;
pub mod models;
pub mod pagination;
pub mod problem;
pub mod screening;
pub mod status;

pub use apgar::{ApgarAssessment, ApgarInterpretation, ApgarScore};
pub use approval::RejectionDialog;
pub use billing::{Money, SoaSummary, StatementOfAccount};
pub use birth_details::{BabyBirthRecord, BabyDetails, BirthDetailsForm, Plurality, SharedBirthFields};
pub use discharge::{DischargeProgress, DischargeRoutes, DischargeStage, DischargeStep, DischargeWorkflow};
pub use error::{BirthcareError, Result};
pub use pagination::{ListFilters, ListQuery, Page, SortDirection, DEFAULT_DEBOUNCE};
pub use problem::ApiProblem;
pub use screening::{NewbornScreening, ScreeningResult};
pub use status::{AdmissionStatus, ApplicationStatus, ApprovalDecision};
