//! Admin review of facility applications

use axum::{
    extract::{Path, RawQuery, State},
    response::Json,
};
use birthcare_core::approval::is_valid_reason;
use birthcare_core::models::{BirthcareApplication, Id};
use birthcare_core::{ApprovalDecision, Page};
use birthcare_store::Action;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{parse_list_query, ApiError};
use crate::{audit, auth::Caller, AppState};

const REASON_REQUIRED: &str = "A rejection reason is required";

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

/// GET /api/admin/birthcare-applications
pub async fn list(
    caller: Caller,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<BirthcareApplication>>, ApiError> {
    let query = parse_list_query(raw)?;
    Ok(Json(caller.client.list_applications(&query).await?))
}

/// POST /api/admin/birthcare-applications/{id}/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Id>,
) -> Result<Json<Value>, ApiError> {
    decide(&state, &caller, id, ApprovalDecision::Approve, None).await
}

/// POST /api/admin/birthcare-applications/{id}/reject
///
/// A blank reason is refused before anything is sent upstream.
pub async fn reject(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Id>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<Value>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    if !is_valid_reason(&request.reason) {
        let mut err = ApiError::unprocessable(REASON_REQUIRED);
        err.body.errors = Some(BTreeMap::from([(
            "reason".to_string(),
            vec![REASON_REQUIRED.to_string()],
        )]));
        return Err(err);
    }
    decide(&state, &caller, id, ApprovalDecision::Reject, Some(&request.reason)).await
}

async fn decide(
    state: &Arc<AppState>,
    caller: &Caller,
    id: Id,
    decision: ApprovalDecision,
    reason: Option<&str>,
) -> Result<Json<Value>, ApiError> {
    let action = match decision {
        ApprovalDecision::Approve => Action::ApproveApplication,
        ApprovalDecision::Reject => Action::RejectApplication,
    };
    let target_id = id.to_string();

    match caller.client.decide_application(id, decision, reason).await {
        Ok(body) => {
            audit::log_action_success(
                &caller.audit,
                action,
                "application",
                &target_id,
                reason,
                &state.audit,
            );
            Ok(Json(json!({
                "status": decision.resulting_status(),
                "upstream": body,
            })))
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                action,
                "application",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}
