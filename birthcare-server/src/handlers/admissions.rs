//! Patient admissions and the gated discharge workflow

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use birthcare_core::models::{Id, NewAdmission, PatientAdmission};
use birthcare_core::{AdmissionStatus, DischargeProgress, DischargeStage, DischargeStep, Page};
use birthcare_store::Action;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{parse_list_query, ApiError};
use crate::{audit, auth::Caller, AppState};

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: AdmissionStatus,
    /// Needed for the slip routes the first time an admission is seen
    #[serde(default)]
    pub patient_id: Option<Id>,
    /// Status of the row as currently displayed
    #[serde(default)]
    pub current_status: Option<AdmissionStatus>,
}

/// GET /api/birthcare/{id}/patient-admissions
pub async fn list(
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<PatientAdmission>>, ApiError> {
    let query = parse_list_query(raw)?;
    Ok(Json(caller.client.list_admissions(birthcare_id, &query).await?))
}

/// POST /api/birthcare/{id}/patient-admissions
pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Json(admission): Json<NewAdmission>,
) -> Result<Response, ApiError> {
    match caller.client.create_admission(birthcare_id, &admission).await {
        Ok(created) => {
            audit::log_action_success(
                &caller.audit,
                Action::CreateAdmission,
                "admission",
                &created.id.to_string(),
                Some(created.status.as_str()),
                &state.audit,
            );
            Ok((StatusCode::CREATED, Json(created)).into_response())
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::CreateAdmission,
                "admission",
                None,
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}

/// GET /api/birthcare/{id}/patient-admissions/{admission_id}/discharge
pub async fn discharge_progress(
    State(state): State<Arc<AppState>>,
    Path((_birthcare_id, admission_id)): Path<(Id, Id)>,
) -> Result<Json<Value>, ApiError> {
    let progress = state.discharge.lock().await.get(admission_id)?;
    Ok(Json(match progress {
        Some(p) => progress_body(&p),
        None => json!({
            "admission_id": admission_id,
            "stage": DischargeStage::NotStarted,
            "mother": false,
            "newborn": false,
        }),
    }))
}

/// PATCH /api/birthcare/{id}/patient-admissions/{admission_id}/status
///
/// `in-labor` and `delivered` are applied directly. `discharged` advances
/// the discharge workflow: mother slip first, then the newborn slip together
/// with the status update.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((birthcare_id, admission_id)): Path<(Id, Id)>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Value>, ApiError> {
    if change.status.is_gated() {
        discharge(&state, &caller, birthcare_id, admission_id, &change).await
    } else {
        direct_change(&state, &caller, birthcare_id, admission_id, change.status).await
    }
}

async fn direct_change(
    state: &Arc<AppState>,
    caller: &Caller,
    birthcare_id: Id,
    admission_id: Id,
    status: AdmissionStatus,
) -> Result<Json<Value>, ApiError> {
    let target_id = admission_id.to_string();
    let upstream = match caller
        .client
        .update_admission_status(birthcare_id, admission_id, status)
        .await
    {
        Ok(body) => body,
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::ChangeStatus,
                "admission",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            return Err(e.into());
        }
    };

    let stage = {
        let store = state.discharge.lock().await;
        match store.get(admission_id)? {
            Some(progress) => match state.workflow.after_direct_change(&progress, status) {
                Some(reset) => {
                    store.put(&reset)?;
                    reset.stage
                }
                None => progress.stage,
            },
            None => DischargeStage::NotStarted,
        }
    };

    audit::log_action_success(
        &caller.audit,
        Action::ChangeStatus,
        "admission",
        &target_id,
        Some(status.as_str()),
        &state.audit,
    );

    Ok(Json(json!({
        "status": status,
        "stage": stage,
        "action": "status_updated",
        "message": format!("Status updated to {}", status.label()),
        "upstream": upstream,
    })))
}

async fn discharge(
    state: &Arc<AppState>,
    caller: &Caller,
    birthcare_id: Id,
    admission_id: Id,
    change: &StatusChange,
) -> Result<Json<Value>, ApiError> {
    let target_id = admission_id.to_string();

    // Read, advance and write under one lock
    let (progress, step) = {
        let store = state.discharge.lock().await;
        let current = match (store.get(admission_id)?, change.patient_id) {
            (Some(progress), _) => progress,
            (None, Some(patient_id)) => DischargeProgress::new(admission_id, patient_id),
            // Discharged elsewhere or before the stage was recorded
            (None, None) if change.current_status == Some(AdmissionStatus::Discharged) => {
                let step = DischargeStep::AlreadyDischarged;
                tracing::debug!(admission_id, action = step.action(), "Discharge step");
                return Ok(Json(step_body(
                    &step,
                    DischargeStage::Discharged,
                    Some(AdmissionStatus::Discharged),
                )));
            }
            (None, None) => {
                return Err(ApiError::unprocessable(
                    "patient_id is required to start the discharge workflow",
                ));
            }
        };
        let (next, step) = state
            .workflow
            .advance(birthcare_id, &current, change.current_status);
        if next.stage != current.stage {
            store.put(&next)?;
        }
        (next, step)
    };

    tracing::info!(
        admission_id,
        stage = progress.stage.as_str(),
        action = step.action(),
        "Discharge step"
    );
    audit::log_action_success(
        &caller.audit,
        Action::DischargeStep,
        "admission",
        &target_id,
        Some(step.action()),
        &state.audit,
    );

    if !step.issues_status_update() {
        let status =
            (progress.stage == DischargeStage::Discharged).then_some(AdmissionStatus::Discharged);
        return Ok(Json(step_body(&step, progress.stage, status)));
    }

    // The PATCH runs outside the lock; the NewbornSlipCreated stage turns any
    // further selection into a no-op, including one made while it is in flight
    let upstream = match caller
        .client
        .update_admission_status(birthcare_id, admission_id, AdmissionStatus::Discharged)
        .await
    {
        Ok(body) => body,
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::ChangeStatus,
                "admission",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            let details = step_body(&step, progress.stage, None);
            let mut err = ApiError::from(e);
            if let Value::Object(map) = details {
                for (key, value) in map {
                    if key != "message" {
                        err.body.details.insert(key, value);
                    }
                }
            }
            return Err(err);
        }
    };

    let done = {
        let store = state.discharge.lock().await;
        let latest = store.get(admission_id)?.unwrap_or(progress);
        if latest.stage == DischargeStage::Discharged {
            latest
        } else {
            let done = state.workflow.complete(&latest)?;
            store.put(&done)?;
            done
        }
    };

    audit::log_action_success(
        &caller.audit,
        Action::ChangeStatus,
        "admission",
        &target_id,
        Some(AdmissionStatus::Discharged.as_str()),
        &state.audit,
    );

    let mut body = step_body(&step, done.stage, Some(AdmissionStatus::Discharged));
    body["upstream"] = upstream;
    Ok(Json(body))
}

fn step_body(step: &DischargeStep, stage: DischargeStage, status: Option<AdmissionStatus>) -> Value {
    json!({
        "status": status,
        "stage": stage,
        "action": step.action(),
        "open_url": step.open_url(),
        "message": step.message(),
    })
}

fn progress_body(progress: &DischargeProgress) -> Value {
    json!({
        "admission_id": progress.admission_id,
        "patient_id": progress.patient_id,
        "stage": progress.stage,
        "mother": progress.mother(),
        "newborn": progress.newborn(),
        "updated_at": progress.updated_at,
    })
}
