//! Birth details and other generated patient documents

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use birthcare_client::save_birth_details;
use birthcare_core::models::{Id, NewPatientDocument};
use birthcare_core::BirthDetailsForm;
use birthcare_store::Action;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::ApiError;
use crate::{audit, auth::Caller, AppState};

#[derive(Debug, Deserialize)]
pub struct SaveBirthDetails {
    pub patient_id: Id,
    #[serde(default)]
    pub admission_id: Option<Id>,
    pub form: BirthDetailsForm,
}

/// POST /api/birthcare/{id}/birth-details
///
/// One document per baby, in birth order. On failure the body reports how
/// many babies were saved before it.
pub async fn save(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Json(request): Json<SaveBirthDetails>,
) -> Result<Response, ApiError> {
    let target_id = request.patient_id.to_string();
    let result = save_birth_details(
        &caller.client,
        birthcare_id,
        request.patient_id,
        request.admission_id,
        &request.form,
        state.renderer.as_ref(),
    )
    .await;

    match result {
        Ok(outcome) => {
            let count = outcome.documents.len().to_string();
            audit::log_action_success(
                &caller.audit,
                Action::SaveBirthDetails,
                "patient",
                &target_id,
                Some(&count),
                &state.audit,
            );
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "saved": outcome.documents.len(),
                    "message": outcome.message,
                    "documents": outcome.documents,
                })),
            )
                .into_response())
        }
        Err(failure) => {
            audit::log_action_error(
                &caller.audit,
                Action::SaveBirthDetails,
                "patient",
                Some(&target_id),
                &failure.to_string(),
                &state.audit,
            );
            let message = failure.user_message();
            let mut err = ApiError::from(failure.error);
            err.body.message = message;
            Err(err
                .with_detail("saved", failure.saved)
                .with_detail("total", failure.total))
        }
    }
}

/// POST /api/birthcare/{id}/patient-documents/from-data
pub async fn save_document(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Json(document): Json<NewPatientDocument>,
) -> Result<Response, ApiError> {
    let target_id = document.patient_id.to_string();
    match caller
        .client
        .save_patient_document(birthcare_id, &document)
        .await
    {
        Ok(saved) => {
            audit::log_action_success(
                &caller.audit,
                Action::SaveDocument,
                "patient",
                &target_id,
                Some(&document.document_type),
                &state.audit,
            );
            Ok((StatusCode::CREATED, Json(saved)).into_response())
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::SaveDocument,
                "patient",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}
