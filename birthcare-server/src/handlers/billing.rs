//! Statement of account

use axum::{
    extract::{Path, Query},
    http::header,
    response::{IntoResponse, Json, Response},
};
use birthcare_core::models::Id;
use birthcare_core::billing::SoaTotals;
use birthcare_core::{SoaSummary, StatementOfAccount};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct SoaQuery {
    pub patient_id: Id,
}

#[derive(Debug, Serialize)]
pub struct SoaResponse {
    pub statement: StatementOfAccount,
    /// Totals computed from the line items
    pub computed: SoaSummary,
    /// Totals to display: the backend's when present
    pub totals: SoaTotals,
    pub matches_backend: bool,
    /// `totals` formatted for display
    pub formatted: FormattedTotals,
}

#[derive(Debug, Serialize)]
pub struct FormattedTotals {
    pub total_charges: String,
    pub total_payments: String,
    pub balance: String,
}

/// GET /api/birthcare/{id}/payments/soa?patient_id=
pub async fn statement(
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Query(query): Query<SoaQuery>,
) -> Result<Json<SoaResponse>, ApiError> {
    let statement = caller
        .client
        .statement_of_account(birthcare_id, query.patient_id)
        .await?;

    let computed = SoaSummary::compute(&statement);
    let matches_backend = computed.matches_backend(&statement);
    if !matches_backend {
        tracing::warn!(
            patient_id = query.patient_id,
            "Computed SOA totals differ from backend totals"
        );
    }
    let totals = SoaSummary::display_totals(&statement);

    Ok(Json(SoaResponse {
        formatted: FormattedTotals {
            total_charges: totals.total_charges.to_string(),
            total_payments: totals.total_payments.to_string(),
            balance: totals.balance.to_string(),
        },
        statement,
        computed,
        totals,
        matches_backend,
    }))
}

/// GET /api/birthcare/{id}/payments/soa/pdf?patient_id=
pub async fn statement_pdf(
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    Query(query): Query<SoaQuery>,
) -> Result<Response, ApiError> {
    let pdf = caller
        .client
        .statement_of_account_pdf(birthcare_id, query.patient_id)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"soa-{}.pdf\"", query.patient_id),
            ),
        ],
        pdf,
    )
        .into_response())
}
