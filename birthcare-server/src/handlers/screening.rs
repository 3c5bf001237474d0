use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use birthcare_core::models::Id;
use birthcare_core::NewbornScreening;
use birthcare_store::Action;
use serde_json::json;
use std::sync::Arc;

use super::ApiError;
use crate::{audit, auth::Caller, AppState};

/// POST /api/birthcare/{id}/newborn-screenings
pub async fn save(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Json(screening): Json<NewbornScreening>,
) -> Result<Response, ApiError> {
    screening.validate()?;

    let target_id = screening.mother.patient_id.to_string();
    match caller
        .client
        .save_newborn_screening(birthcare_id, &screening)
        .await
    {
        Ok(body) => {
            let abnormal: Vec<&str> = screening
                .abnormal_tests()
                .iter()
                .map(|row| row.disorder.as_str())
                .collect();
            if !abnormal.is_empty() {
                tracing::info!(patient_id = %target_id, abnormal = ?abnormal, "Abnormal newborn screening results");
            }
            audit::log_action_success(
                &caller.audit,
                Action::SaveScreening,
                "patient",
                &target_id,
                None,
                &state.audit,
            );
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "complete": screening.is_complete(),
                    "abnormal_tests": abnormal,
                    "upstream": body,
                })),
            )
                .into_response())
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::SaveScreening,
                "patient",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}
