//! User model
//!
//! Users are either administrators (who log in with a password) or
//! interns managed by administrators. Interns have no credentials;
//! they exist to be organized into units and targeted by campaigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{verify_password, PasswordError};

use super::UnitFilter;

/// Role string for administrators
pub const ROLE_ADMIN: &str = "admin";

/// Role string for interns
pub const ROLE_USER: &str = "user";

/// User model errors
#[derive(Debug, Error)]
pub enum UserError {
    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Validation failed
    #[error("Validation error: {0}")]
    ValidationFailed(String),
}

/// Email address newtype
///
/// Normalizes to lowercase and rejects malformed addresses before
/// they reach the unique index.
///
/// # Example
///
/// ```rust
/// use cohort_portal::models::EmailAddress;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let email = EmailAddress::parse("Jane@Example.COM")?;
/// assert_eq!(email.as_str(), "jane@example.com");
///
/// assert!(EmailAddress::parse("not-an-email").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and validate an email address
    ///
    /// # Errors
    ///
    /// Returns an error if the email format is invalid
    pub fn parse(email: impl Into<String>) -> Result<Self, UserError> {
        #[derive(Validate)]
        struct EmailValidator {
            #[validate(email)]
            email: String,
        }

        let email = email.into().trim().to_string();

        if !email.contains('@') || !email.contains('.') {
            return Err(UserError::InvalidEmail(
                "Email must contain @ and domain".to_string(),
            ));
        }

        let validator = EmailValidator {
            email: email.clone(),
        };

        validator
            .validate()
            .map_err(|e| UserError::ValidationFailed(format!("Invalid email format: {e}")))?;

        Ok(Self(email.to_lowercase()))
    }

    /// Get the email as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account
///
/// The password hash and stored refresh token never appear in
/// responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID (primary key)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (unique, stored lowercase)
    pub email: String,

    /// Argon2id password hash, present for admins only
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Role: `admin` or `user`
    pub role: String,

    /// Unit membership, if assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<Uuid>,

    /// Whether an admin has approved this account
    pub is_approved: bool,

    /// Reason given when the account was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    /// Stored refresh token for the current admin session
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    /// Last successful login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the account was last updated
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, unit_id, is_approved, \
                            rejection_reason, refresh_token, last_login, created_at, updated_at";

impl User {
    /// Verify a password against this user's hash
    ///
    /// Accounts without a stored hash (interns) never match.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash cannot be parsed
    pub fn verify_password(&self, password: &str) -> Result<bool, PasswordError> {
        match &self.password_hash {
            Some(hash) => verify_password(password, hash),
            None => Ok(false),
        }
    }

    /// Find a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (expects an already-lowercased address)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Check whether an email address is already registered
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Create an intern account
    ///
    /// Interns start unapproved, with the `user` role and no
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails (including
    /// the unique constraint on `email`)
    pub async fn create_intern(
        pool: &PgPool,
        name: &str,
        email: &EmailAddress,
        unit_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO users (name, email, role, unit_id, is_approved) \
             VALUES ($1, $2, $3, $4, FALSE) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email.as_str())
        .bind(ROLE_USER)
        .bind(unit_id)
        .fetch_one(pool)
        .await
    }

    /// Persist approval status, rejection reason, and unit assignment
    ///
    /// The caller computes the new field values (approve clears the
    /// rejection reason, `unassigned` clears the unit) and this
    /// writes them in one statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn apply_status(
        pool: &PgPool,
        id: Uuid,
        is_approved: bool,
        rejection_reason: Option<&str>,
        unit_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE users \
             SET is_approved = $2, rejection_reason = $3, unit_id = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_approved)
        .bind(rejection_reason)
        .bind(unit_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a user
    ///
    /// Returns `false` if no such user existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear the unit reference on every member of a unit
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn clear_unit(pool: &PgPool, unit_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET unit_id = NULL, updated_at = NOW() WHERE unit_id = $1")
                .bind(unit_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Record a successful admin login
    ///
    /// Stores the new refresh token and stamps `last_login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn record_login(
        pool: &PgPool,
        id: Uuid,
        refresh_token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET refresh_token = $2, last_login = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(refresh_token)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Replace (or clear) the stored refresh token
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(refresh_token)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Paginated, filtered user listing
    ///
    /// Returns the page of users (newest first) plus the total match
    /// count for pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails
    pub async fn search(
        pool: &PgPool,
        params: &UserSearch,
    ) -> Result<(Vec<UserView>, i64), sqlx::Error> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE 1=1");
        push_filters(&mut count_query, params);
        let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let mut page_query = QueryBuilder::<Postgres>::new(
            "SELECT u.id, u.name, u.email, u.role, u.unit_id, un.name AS unit_name, \
             u.is_approved, u.rejection_reason, u.last_login, u.created_at \
             FROM users u LEFT JOIN units un ON un.id = u.unit_id WHERE 1=1",
        );
        push_filters(&mut page_query, params);
        page_query.push(" ORDER BY u.created_at DESC LIMIT ");
        page_query.push_bind(i64::from(params.limit));
        page_query.push(" OFFSET ");
        page_query.push_bind(i64::from(params.page.saturating_sub(1)) * i64::from(params.limit));

        let rows: Vec<UserViewRow> = page_query.build_query_as().fetch_all(pool).await?;

        Ok((rows.into_iter().map(UserView::from).collect(), total))
    }
}

/// Parameters for the paginated user listing
#[derive(Debug, Clone)]
pub struct UserSearch {
    /// Role filter (`admin` / `user`), already stripped of the `all`
    /// sentinel
    pub role: Option<String>,

    /// Unit filter
    pub unit: UnitFilter,

    /// Approval filter
    pub approved: Option<bool>,

    /// Case-insensitive substring over name and email
    pub search: Option<String>,

    /// 1-based page number
    pub page: u32,

    /// Page size
    pub limit: u32,
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, params: &UserSearch) {
    if let Some(role) = &params.role {
        query.push(" AND u.role = ");
        query.push_bind(role.clone());
    }

    match params.unit {
        UnitFilter::Any => {}
        UnitFilter::Unassigned => {
            query.push(" AND u.unit_id IS NULL");
        }
        UnitFilter::Id(id) => {
            query.push(" AND u.unit_id = ");
            query.push_bind(id);
        }
    }

    if let Some(approved) = params.approved {
        query.push(" AND u.is_approved = ");
        query.push_bind(approved);
    }

    if let Some(search) = &params.search {
        let pattern = format!("%{search}%");
        query.push(" AND (u.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

/// Unit reference embedded in user listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    /// Unit ID
    pub id: Uuid,

    /// Unit name
    pub name: String,
}

/// A user row shaped for the admin listing, unit resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role
    pub role: String,

    /// Resolved unit, if assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitSummary>,

    /// Approval status
    pub is_approved: bool,

    /// Rejection reason, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    /// Last successful login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct UserViewRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    unit_id: Option<Uuid>,
    unit_name: Option<String>,
    is_approved: bool,
    rejection_reason: Option<String>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserViewRow> for UserView {
    fn from(row: UserViewRow) -> Self {
        let unit = match (row.unit_id, row.unit_name) {
            (Some(id), Some(name)) => Some(UnitSummary { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            unit,
            is_approved: row.is_approved,
            rejection_reason: row.rejection_reason,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: None,
            role: ROLE_USER.to_string(),
            unit_id: None,
            is_approved: false,
            rejection_reason: None,
            refresh_token: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn email_parse_normalizes_to_lowercase() {
        let email = EmailAddress::parse("Jane@Example.COM").expect("valid email");
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn email_parse_rejects_missing_at() {
        assert!(matches!(
            EmailAddress::parse("janeexample.com"),
            Err(UserError::InvalidEmail(_))
        ));
    }

    #[test]
    fn email_parse_rejects_missing_domain_dot() {
        assert!(EmailAddress::parse("jane@example").is_err());
    }

    #[test]
    fn email_parse_trims_whitespace() {
        let email = EmailAddress::parse("  jane@example.com ").expect("valid email");
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn intern_without_hash_never_verifies() {
        let user = test_user();
        assert!(!user.verify_password("anything").expect("verify"));
    }

    #[test]
    fn admin_password_roundtrip() {
        let mut user = test_user();
        user.role = ROLE_ADMIN.to_string();
        user.password_hash = Some(hash_password("correct-horse").expect("hash"));

        assert!(user.verify_password("correct-horse").expect("verify"));
        assert!(!user.verify_password("wrong").expect("verify"));
    }

    #[test]
    fn serialization_hides_secrets() {
        let mut user = test_user();
        user.password_hash = Some("$argon2id$secret".to_string());
        user.refresh_token = Some("token".to_string());

        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refreshToken").is_none());
    }

    #[test]
    fn user_view_resolves_unit_pair() {
        let unit_id = Uuid::new_v4();
        let row = UserViewRow {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: ROLE_USER.to_string(),
            unit_id: Some(unit_id),
            unit_name: Some("Engineering".to_string()),
            is_approved: true,
            rejection_reason: None,
            last_login: None,
            created_at: Utc::now(),
        };

        let view = UserView::from(row);
        let unit = view.unit.expect("unit present");
        assert_eq!(unit.id, unit_id);
        assert_eq!(unit.name, "Engineering");
    }

    #[test]
    fn user_view_without_unit() {
        let row = UserViewRow {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: ROLE_USER.to_string(),
            unit_id: None,
            unit_name: None,
            is_approved: false,
            rejection_reason: Some("missing paperwork".to_string()),
            last_login: None,
            created_at: Utc::now(),
        };

        assert!(UserView::from(row).unit.is_none());
    }
}
