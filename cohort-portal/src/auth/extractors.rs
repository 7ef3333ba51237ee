//! Authentication extractors
//!
//! Admin routes authenticate with a Bearer access token. The
//! [`AdminClaims`] extractor verifies the token and enforces the
//! admin role before the handler body runs.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::{error::ApiError, models::user::ROLE_ADMIN, state::AppState};

use super::tokens::Claims;

/// Extractor for an authenticated administrator
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(AdminClaims(claims): AdminClaims) -> String {
///     format!("Hello, {}!", claims.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Access token is required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Access token is required"))?;

        let claims = state
            .tokens()
            .verify_access(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired access token"))?;

        if claims.role != ROLE_ADMIN {
            tracing::warn!(subject = %claims.sub, "non-admin attempted admin route");
            return Err(ApiError::Forbidden(
                "Access denied: Admin privileges required".to_string(),
            ));
        }

        Ok(Self(claims))
    }
}
