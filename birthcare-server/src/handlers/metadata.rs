use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use birthcare_core::DischargeStage;
use serde_json::{json, Value};
use std::sync::Arc;

use super::ApiError;
use crate::AppState;

const RECENT_ACTIVITY: usize = 20;

/// Health check (GET /health)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Console status (GET /status)
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let (in_progress, discharged) = {
        let store = state.discharge.lock().await;
        let records = store.list()?;
        let in_progress = records
            .iter()
            .filter(|p| {
                matches!(
                    p.stage,
                    DischargeStage::MotherSlipCreated | DischargeStage::NewbornSlipCreated
                )
            })
            .count();
        let discharged = records
            .iter()
            .filter(|p| p.stage == DischargeStage::Discharged)
            .count();
        (in_progress, discharged)
    };

    let recent = {
        let audit = state.audit.lock().await;
        audit.recent_entries(RECENT_ACTIVITY)?
    };

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.upstream.base_url(),
        "storage_backend": state.config.storage.backend,
        "discharge": {
            "in_progress": in_progress,
            "discharged": discharged,
        },
        "recent_activity": recent,
    })))
}
