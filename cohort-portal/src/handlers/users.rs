//! User management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AdminClaims,
    error::ApiError,
    models::{parse_approval, user::UserSearch, EmailAddress, Unit, UnitFilter, User},
    roster::{parse_roster, RosterEntry},
    state::AppState,
};

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query parameters for the paginated user listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserListQuery {
    /// Role filter (`admin` / `user` / `all`)
    pub role: Option<String>,

    /// Unit ID, `all`, or `unassigned`
    pub unit_id: Option<String>,

    /// `true`, `false`, or `all`
    pub is_approved: Option<String>,

    /// Case-insensitive substring over name and email
    pub search: Option<String>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Page size
    pub limit: Option<u32>,
}

/// `GET /admin/users`
///
/// # Errors
///
/// Returns `BadRequest` for an unparseable unit id.
pub async fn list_users(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = UnitFilter::parse(query.unit_id.as_deref())
        .map_err(|raw| ApiError::BadRequest(format!("Invalid unit id: {raw}")))?;

    let params = UserSearch {
        role: query.role.filter(|role| role != "all"),
        unit,
        approved: parse_approval(query.is_approved.as_deref()),
        search: query.search,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100),
    };

    let (users, total) = User::search(state.db(), &params).await?;
    let total_pages = (total + i64::from(params.limit) - 1) / i64::from(params.limit);

    Ok(Json(json!({
        "success": true,
        "count": users.len(),
        "totalPages": total_pages,
        "currentPage": params.page,
        "data": users,
    })))
}

/// Single or bulk intern input
///
/// A string is parsed as a free-text roster; an object adds exactly
/// one intern.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InternInput {
    /// Free-text block, one entry per line or comma-separated segment
    Bulk(String),

    /// A single explicit entry
    Single {
        /// Display name
        name: String,
        /// Email address
        email: String,
    },
}

/// Request body for `POST /admin/users/add-interns`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInternsRequest {
    /// Unit to assign the new interns to
    #[serde(default)]
    pub unit_id: Option<Uuid>,

    /// Intern input (bulk text or single entry)
    #[serde(default)]
    pub input: Option<InternInput>,
}

/// Tally of one add-interns call
#[derive(Debug, Default, Serialize)]
pub struct AddInternsOutcome {
    /// Accounts created
    pub added: u32,

    /// Entries skipped because the email already exists
    pub skipped: u32,

    /// One entry per candidate that could not be created
    pub errors: Vec<String>,
}

/// `POST /admin/users/add-interns`
///
/// Parses the input into candidates, skips emails that already have
/// an account, and creates the rest as unapproved interns. Individual
/// failures are collected, not fatal.
///
/// # Errors
///
/// Returns `BadRequest` when the input is missing or yields no valid
/// candidates, or `NotFound` for an unknown unit.
pub async fn add_interns(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Json(request): Json<AddInternsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = request
        .input
        .ok_or_else(|| ApiError::bad_request("User data is required"))?;

    let candidates: Vec<RosterEntry> = match input {
        InternInput::Bulk(text) => parse_roster(&text),
        InternInput::Single { name, email } => vec![RosterEntry { name, email }],
    };

    if candidates.is_empty() {
        return Err(ApiError::bad_request("No valid users found in input"));
    }

    if let Some(unit_id) = request.unit_id {
        Unit::find_by_id(state.db(), unit_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Unit not found"))?;
    }

    let mut outcome = AddInternsOutcome::default();

    for candidate in &candidates {
        let email = match EmailAddress::parse(&candidate.email) {
            Ok(email) => email,
            Err(error) => {
                outcome
                    .errors
                    .push(format!("Failed to add {}: {error}", candidate.email));
                continue;
            }
        };

        if User::email_exists(state.db(), email.as_str()).await? {
            outcome.skipped += 1;
            continue;
        }

        match User::create_intern(state.db(), &candidate.name, &email, request.unit_id).await {
            Ok(_) => outcome.added += 1,
            Err(error) => {
                outcome
                    .errors
                    .push(format!("Failed to add {}: {error}", candidate.email));
            }
        }
    }

    tracing::info!(
        candidates = candidates.len(),
        added = outcome.added,
        skipped = outcome.skipped,
        "processed intern roster"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!(
                "Processed {} entries: {} added, {} skipped.",
                candidates.len(),
                outcome.added,
                outcome.skipped
            ),
            "data": outcome,
        })),
    ))
}

/// Request body for `PATCH /admin/users/{id}/status`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserStatusRequest {
    /// New approval status
    pub is_approved: Option<bool>,

    /// Reason recorded alongside a rejection
    pub rejection_reason: Option<String>,

    /// New unit id, or `unassigned` to clear
    pub unit_id: Option<String>,
}

/// `PATCH /admin/users/{id}/status`
///
/// Approving a user clears any stored rejection reason; rejecting may
/// record one. `unitId: "unassigned"` clears the unit assignment.
///
/// # Errors
///
/// Returns `NotFound` for unknown user or unit ids and `BadRequest`
/// for a malformed unit id.
pub async fn update_user_status(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut is_approved = user.is_approved;
    let mut rejection_reason = user.rejection_reason.clone();

    if let Some(approved) = request.is_approved {
        is_approved = approved;
        if approved {
            rejection_reason = None;
        } else if let Some(reason) = request.rejection_reason {
            rejection_reason = Some(reason);
        }
    }

    let unit_id = match request.unit_id.as_deref() {
        None => user.unit_id,
        Some("unassigned") => None,
        Some(raw) => {
            let unit_id = Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest(format!("Invalid unit id: {raw}")))?;
            Unit::find_by_id(state.db(), unit_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Unit not found"))?;
            Some(unit_id)
        }
    };

    let updated = User::apply_status(
        state.db(),
        id,
        is_approved,
        rejection_reason.as_deref(),
        unit_id,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "User status updated successfully",
        "data": updated,
    })))
}

/// `DELETE /admin/users/{id}`
///
/// # Errors
///
/// Returns `NotFound` if the user does not exist.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !User::delete(state.db(), id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}
