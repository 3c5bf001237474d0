//! Facility owner screens: profile, resubmission, documents, dashboard

use axum::{
    extract::{Multipart, Path, State},
    response::Json,
};
use birthcare_client::DocumentUpload;
use birthcare_core::models::{Birthcare, BirthcareUpdate, DashboardStatistics, Id};
use birthcare_store::Action;
use serde_json::{json, Value};
use std::sync::Arc;

use super::ApiError;
use crate::{audit, auth::Caller, AppState};

/// GET /api/owner/birthcare
pub async fn show(caller: Caller) -> Result<Json<Birthcare>, ApiError> {
    Ok(Json(caller.client.facility().await?))
}

/// PUT /api/owner/birthcare
pub async fn update(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(update): Json<BirthcareUpdate>,
) -> Result<Json<Birthcare>, ApiError> {
    match caller.client.update_facility(&update).await {
        Ok(facility) => {
            audit::log_action_success(
                &caller.audit,
                Action::UpdateFacility,
                "birthcare",
                &facility.id.to_string(),
                None,
                &state.audit,
            );
            Ok(Json(facility))
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::UpdateFacility,
                "birthcare",
                None,
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}

/// POST /api/owner/birthcare/{id}/resubmit
pub async fn resubmit(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Id>,
) -> Result<Json<Value>, ApiError> {
    let target_id = id.to_string();
    match caller.client.resubmit_facility(id).await {
        Ok(body) => {
            audit::log_action_success(
                &caller.audit,
                Action::ResubmitFacility,
                "birthcare",
                &target_id,
                None,
                &state.audit,
            );
            Ok(Json(body))
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::ResubmitFacility,
                "birthcare",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}

/// POST /api/owner/birthcare/{id}/documents
///
/// Multipart with a `document` file field and a `document_type` text field.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<Id>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut document_type = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                document_type = Some(text);
            }
            "document" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                file = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, bytes)) = file else {
        return Err(ApiError::unprocessable("A document file is required"));
    };
    let document_type = document_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::unprocessable("A document type is required"))?;

    tracing::debug!(birthcare_id = id, %file_name, size = bytes.len(), "Uploading facility document");
    let upload = DocumentUpload {
        document_type: document_type.clone(),
        file_name,
        content_type,
        bytes,
    };

    let target_id = id.to_string();
    match caller.client.upload_facility_document(id, upload).await {
        Ok(body) => {
            audit::log_action_success(
                &caller.audit,
                Action::UploadDocument,
                "birthcare",
                &target_id,
                Some(&document_type),
                &state.audit,
            );
            Ok(Json(json!({ "document_type": document_type, "upstream": body })))
        }
        Err(e) => {
            audit::log_action_error(
                &caller.audit,
                Action::UploadDocument,
                "birthcare",
                Some(&target_id),
                &e.to_string(),
                &state.audit,
            );
            Err(e.into())
        }
    }
}

/// GET /api/owner/dashboard/statistics
pub async fn dashboard(caller: Caller) -> Result<Json<Value>, ApiError> {
    let stats: DashboardStatistics = caller.client.dashboard_statistics().await?;
    let occupancy = stats.occupancy_percent();
    Ok(Json(json!({
        "statistics": stats,
        "occupancy_percent": occupancy,
    })))
}
