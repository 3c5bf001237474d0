use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use birthcare_core::models::{Id, NewPrenatalVisit, PrenatalVisit};
use birthcare_core::Page;
use birthcare_store::Action;
use std::sync::Arc;

use super::{parse_list_query, ApiError};
use crate::{audit, auth::Caller, AppState};

/// GET /api/birthcare/{id}/prenatal-visits
pub async fn list(
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<PrenatalVisit>>, ApiError> {
    let query = parse_list_query(raw)?;
    Ok(Json(
        caller
            .client
            .list_prenatal_visits(birthcare_id, &query)
            .await?,
    ))
}

/// POST /api/birthcare/{id}/prenatal-visits
pub async fn create(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Json(visit): Json<NewPrenatalVisit>,
) -> Result<Response, ApiError> {
    if visit.visit_date.trim().is_empty() {
        return Err(ApiError::unprocessable("Visit date is required"));
    }

    let target_id = visit.patient_id.to_string();
    match caller
        .client
        .create_prenatal_visit(birthcare_id, &visit)
        .await
    {
        Ok(created) => {
            audit::log_action_success(
                &caller.audit,
                Action::CreatePrenatalVisit,
                "patient",
                &target_id,
                Some(&created.visit_date),
                &state.audit,
            );
            Ok((StatusCode::CREATED, Json(created)).into_response())
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::CreatePrenatalVisit,
                "patient",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}
