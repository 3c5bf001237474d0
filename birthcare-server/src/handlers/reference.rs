//! Reference data for the admission and prenatal forms

use axum::{
    extract::{Path, RawQuery},
    response::Json,
};
use birthcare_core::models::{Bed, Id, Patient, Room, StaffMember};
use birthcare_core::Page;

use super::{parse_list_query, ApiError};
use crate::auth::Caller;

pub async fn rooms(caller: Caller, Path(birthcare_id): Path<Id>) -> Result<Json<Vec<Room>>, ApiError> {
    Ok(Json(caller.client.rooms(birthcare_id).await?))
}

/// Beds of one room; occupied beds are included and flagged
pub async fn beds(
    caller: Caller,
    Path((birthcare_id, room_id)): Path<(Id, Id)>,
) -> Result<Json<Vec<Bed>>, ApiError> {
    Ok(Json(caller.client.beds(birthcare_id, room_id).await?))
}

pub async fn staff(
    caller: Caller,
    Path(birthcare_id): Path<Id>,
) -> Result<Json<Vec<StaffMember>>, ApiError> {
    Ok(Json(caller.client.staff(birthcare_id).await?))
}

pub async fn patients(
    caller: Caller,
    Path(birthcare_id): Path<Id>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<Patient>>, ApiError> {
    let query = parse_list_query(raw)?;
    Ok(Json(caller.client.patients(birthcare_id, &query).await?))
}
