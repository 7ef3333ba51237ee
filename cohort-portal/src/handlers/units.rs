//! Unit management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{auth::AdminClaims, error::ApiError, models::Unit, state::AppState};

/// Request body for `POST /admin/units`
#[derive(Debug, Deserialize)]
pub struct CreateUnitRequest {
    /// Unit name (unique)
    #[serde(default)]
    pub name: String,

    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
}

/// `POST /admin/units`
///
/// # Errors
///
/// Returns `BadRequest` for a missing name or a duplicate.
pub async fn create_unit(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Json(request): Json<CreateUnitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Unit name is required"));
    }

    if Unit::find_by_name(state.db(), name).await?.is_some() {
        return Err(ApiError::bad_request("Unit with this name already exists"));
    }

    let unit = Unit::create(state.db(), name, request.description.as_deref()).await?;

    tracing::info!(unit = %unit.name, "admin created unit");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Unit created successfully",
            "data": unit,
        })),
    ))
}

/// `GET /admin/units`
///
/// # Errors
///
/// Returns an error only on database failure.
pub async fn list_units(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
) -> Result<impl IntoResponse, ApiError> {
    let units = Unit::find_all(state.db()).await?;

    Ok(Json(json!({
        "success": true,
        "data": units,
    })))
}

/// `GET /admin/units/{id}`
///
/// # Errors
///
/// Returns `NotFound` if the unit does not exist.
pub async fn get_unit(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = Unit::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Unit not found"))?;

    Ok(Json(json!({
        "success": true,
        "data": unit,
    })))
}

/// Request body for `PATCH /admin/units/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUnitRequest {
    /// New name (renames must stay unique)
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// `PATCH /admin/units/{id}`
///
/// # Errors
///
/// Returns `NotFound` for an unknown unit and `BadRequest` when the
/// new name is already taken.
pub async fn update_unit(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUnitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = Unit::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Unit not found"))?;

    let mut name = unit.name.clone();
    if let Some(new_name) = request.name.as_deref().map(str::trim) {
        if !new_name.is_empty() && new_name != unit.name {
            if Unit::find_by_name(state.db(), new_name).await?.is_some() {
                return Err(ApiError::bad_request("Unit with this name already exists"));
            }
            name = new_name.to_string();
        }
    }

    let description = request.description.or(unit.description);

    let updated = Unit::update(state.db(), id, &name, description.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("Unit not found"))?;

    tracing::info!(unit_id = %id, unit = %updated.name, "admin updated unit");

    Ok(Json(json!({
        "success": true,
        "message": "Unit updated successfully",
        "data": updated,
    })))
}

/// `DELETE /admin/units/{id}`
///
/// Members of the unit are kept; their unit reference is cleared.
///
/// # Errors
///
/// Returns `NotFound` if the unit does not exist.
pub async fn delete_unit(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = Unit::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Unit not found"))?;

    Unit::delete(state.db(), id).await?;

    tracing::info!(unit_id = %id, unit = %unit.name, "admin deleted unit");

    Ok(Json(json!({
        "success": true,
        "message": "Unit deleted successfully",
    })))
}
