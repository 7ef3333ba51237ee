//! Recipient selection for email campaigns
//!
//! A recipient is a user projected into the shape needed for
//! targeting and templating, with the unit name resolved. The
//! recipient-selection view is unpaginated, unlike the general user
//! listing.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{parse_approval, UnitFilter},
};

/// A user projected for email targeting and templating
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Underlying user ID
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role
    pub role: String,

    /// Resolved unit name, when assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Approval status
    pub is_approved: bool,
}

/// Query-string filters for the recipient listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipientQuery {
    /// Unit ID, `all`, or `unassigned`
    pub unit_id: Option<String>,

    /// `true`, `false`, or `all`
    pub is_approved: Option<String>,

    /// Case-insensitive substring over name and email
    pub search: Option<String>,
}

const RECIPIENT_SELECT: &str = "SELECT u.id AS user_id, u.name, u.email, u.role, \
                                un.name AS unit, u.is_approved \
                                FROM users u LEFT JOIN units un ON un.id = u.unit_id";

/// Find all recipients matching the given filters
///
/// # Errors
///
/// Returns `BadRequest` for an unparseable unit id and `Database` on
/// query failure.
pub async fn find_recipients(
    pool: &PgPool,
    query: &RecipientQuery,
) -> Result<Vec<Recipient>, ApiError> {
    let unit = UnitFilter::parse(query.unit_id.as_deref())
        .map_err(|raw| ApiError::BadRequest(format!("Invalid unit id: {raw}")))?;
    let approved = parse_approval(query.is_approved.as_deref());

    let mut builder = QueryBuilder::<Postgres>::new(RECIPIENT_SELECT);
    builder.push(" WHERE 1=1");

    match unit {
        UnitFilter::Any => {}
        UnitFilter::Unassigned => {
            builder.push(" AND u.unit_id IS NULL");
        }
        UnitFilter::Id(id) => {
            builder.push(" AND u.unit_id = ");
            builder.push_bind(id);
        }
    }

    if let Some(approved) = approved {
        builder.push(" AND u.is_approved = ");
        builder.push_bind(approved);
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{search}%");
        builder.push(" AND (u.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR u.email ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    builder.push(" ORDER BY u.name");

    let recipients = builder.build_query_as().fetch_all(pool).await?;
    Ok(recipients)
}

/// Resolve a set of recipient ids against the user store
///
/// Ids that do not resolve to a live user are silently absent from
/// the result; callers must not treat a shorter result as an error.
///
/// # Errors
///
/// Returns an error if the database operation fails
pub async fn resolve_recipients(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<Recipient>, sqlx::Error> {
    sqlx::query_as::<_, Recipient>(&format!("{RECIPIENT_SELECT} WHERE u.id = ANY($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await
}

/// Resolve a single recipient id
///
/// # Errors
///
/// Returns an error if the database operation fails
pub async fn resolve_recipient(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<Recipient>, sqlx::Error> {
    sqlx::query_as::<_, Recipient>(&format!("{RECIPIENT_SELECT} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}
