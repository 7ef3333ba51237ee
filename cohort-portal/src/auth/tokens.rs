//! Access and refresh token issuance
//!
//! Admin sessions use short-lived JWT access tokens plus rotating
//! refresh tokens. The refresh token is itself a JWT, and the
//! currently-valid one is persisted on the user row so a stolen older
//! token cannot be replayed after rotation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::AuthSettings, models::User};

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Token is malformed, expired, or has a bad signature
    #[error("invalid or expired token")]
    Invalid,

    /// Token is valid but of the wrong kind (access vs refresh)
    #[error("wrong token type")]
    WrongKind,

    /// Service misconfiguration
    #[error("auth configuration error: {0}")]
    Config(String),
}

/// Discriminates access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer token sent on every request
    Access,

    /// Long-lived token exchanged for new pairs
    Refresh,
}

/// JWT claims for both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID
    pub sub: String,

    /// User email
    pub email: String,

    /// User role (`admin` / `user`)
    pub role: String,

    /// Token kind
    pub kind: TokenKind,

    /// Issued at (unix timestamp)
    pub iat: i64,

    /// Expiry (unix timestamp)
    pub exp: i64,
}

/// A freshly issued access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Bearer token for API requests
    pub access_token: String,

    /// Rotating refresh token
    pub refresh_token: String,
}

/// Issues and verifies the portal's tokens
///
/// Constructed once at startup from [`AuthSettings`] and shared via
/// application state.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    /// Build the service from auth settings
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Config` if the JWT secret is empty.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, TokenError> {
        if settings.jwt_secret.is_empty() {
            return Err(TokenError::Config(
                "auth.jwt_secret must be configured".to_string(),
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            access_ttl_secs: i64::try_from(settings.access_ttl_secs)
                .map_err(|_| TokenError::Config("access_ttl_secs out of range".to_string()))?,
            refresh_ttl_secs: i64::try_from(settings.refresh_ttl_secs)
                .map_err(|_| TokenError::Config("refresh_ttl_secs out of range".to_string()))?,
        })
    }

    /// Issue an access/refresh pair for a user
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user, TokenKind::Access, self.access_ttl_secs)?,
            refresh_token: self.issue(user, TokenKind::Refresh, self.refresh_ttl_secs)?,
        })
    }

    fn issue(&self, user: &User, kind: TokenKind, ttl_secs: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            kind,
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify an access token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for bad/expired tokens and
    /// `TokenError::WrongKind` for refresh tokens.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Access)
    }

    /// Verify a refresh token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for bad/expired tokens and
    /// `TokenError::WrongKind` for access tokens.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;

        if data.claims.kind != expected {
            return Err(TokenError::WrongKind);
        }

        Ok(data.claims)
    }
}
