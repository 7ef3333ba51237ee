//! Authentication handlers
//!
//! Admin login issues a JWT access token plus a rotating refresh
//! token; the refresh token currently accepted for a user is stored
//! on the user row and replaced on every rotation.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::ApiError,
    models::{user::ROLE_ADMIN, User},
    state::AppState,
};

use super::extractors::AdminClaims;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Admin email
    #[validate(email)]
    pub email: String,

    /// Admin password
    #[validate(length(min = 1))]
    pub password: String,
}

/// Refresh request payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token issued at login or last rotation
    pub refresh_token: String,
}

/// Logout request payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoutRequest {
    /// Refresh token to invalidate, when the client still has one
    pub refresh_token: Option<String>,
}

/// `POST /auth/admin/login`
///
/// # Errors
///
/// Returns `Unauthorized` for unknown accounts, non-admin accounts,
/// and wrong passwords; the three cases are indistinguishable to the
/// caller.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let email = request.email.trim().to_lowercase();
    tracing::info!(%email, "admin login attempt");

    let user = User::find_by_email(state.db(), &email)
        .await?
        .ok_or_else(|| {
            tracing::warn!(%email, "no account found");
            ApiError::unauthorized("Invalid credentials")
        })?;

    if user.role != ROLE_ADMIN {
        tracing::warn!(%email, "non-admin attempted admin login");
        return Err(ApiError::unauthorized(
            "Access denied: Admin privileges required",
        ));
    }

    let password_ok = user
        .verify_password(&request.password)
        .map_err(|e| ApiError::Internal(e.into()))?;
    if !password_ok {
        tracing::warn!(%email, "incorrect password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let pair = state
        .tokens()
        .issue_pair(&user)
        .map_err(|e| ApiError::Internal(e.into()))?;

    User::record_login(state.db(), user.id, &pair.refresh_token).await?;

    tracing::info!(%email, "admin login successful");

    Ok(Json(json!({
        "success": true,
        "accessToken": pair.access_token,
        "refreshToken": pair.refresh_token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        },
    })))
}

/// `POST /auth/refresh`
///
/// Rotates the refresh token: the presented token must match the one
/// stored for the user, and both tokens of the returned pair replace
/// it.
///
/// # Errors
///
/// Returns `Unauthorized` when the token is invalid, expired,
/// revoked, or belongs to a non-admin.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state
        .tokens()
        .verify_refresh(&request.refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let user = User::find_by_id(state.db(), user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if user.role != ROLE_ADMIN {
        return Err(ApiError::unauthorized(
            "Access denied: Admin privileges required to refresh token",
        ));
    }

    if user.refresh_token.as_deref() != Some(request.refresh_token.as_str()) {
        tracing::warn!(email = %user.email, "refresh attempted with a revoked token");
        return Err(ApiError::unauthorized("Invalid refresh token"));
    }

    let pair = state
        .tokens()
        .issue_pair(&user)
        .map_err(|e| ApiError::Internal(e.into()))?;

    User::set_refresh_token(state.db(), user.id, Some(&pair.refresh_token)).await?;

    Ok(Json(json!({
        "success": true,
        "accessToken": pair.access_token,
        "refreshToken": pair.refresh_token,
    })))
}

/// `POST /auth/logout`
///
/// Clears the stored refresh token when the presented one is still
/// current. Always reports success; verification problems are only
/// logged.
///
/// # Errors
///
/// Returns an error only on database failure.
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = &request.refresh_token {
        match state.tokens().verify_refresh(token) {
            Ok(claims) => {
                if let Ok(user_id) = Uuid::parse_str(&claims.sub) {
                    if let Some(user) = User::find_by_id(state.db(), user_id).await? {
                        if user.refresh_token.as_deref() == Some(token.as_str()) {
                            User::set_refresh_token(state.db(), user.id, None).await?;
                        }
                    }
                }
            }
            Err(error) => {
                tracing::warn!(%error, "logout presented an unverifiable refresh token");
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully",
    })))
}

/// `GET /auth/verify`
///
/// Confirms that the presented access token is valid and admin-roled.
pub async fn verify(AdminClaims(claims): AdminClaims) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "user": {
            "id": claims.sub,
            "role": claims.role,
        },
    }))
}
