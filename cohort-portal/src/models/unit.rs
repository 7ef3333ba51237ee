//! Unit model
//!
//! A unit is a named grouping of users (a department or track).
//! Units own nothing: deleting one clears the unit reference on its
//! members instead of deleting them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::user::User;

/// A named grouping of users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// Unit ID (primary key)
    pub id: Uuid,

    /// Unit name (unique)
    pub name: String,

    /// Optional free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Timestamp when the unit was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the unit was last updated
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    /// List all units ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, name, description, created_at, updated_at
            FROM units
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await
    }

    /// Find a unit by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, name, description, created_at, updated_at
            FROM units
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find a unit by its (unique) name
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, name, description, created_at, updated_at
            FROM units
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Create a new unit
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails (including
    /// the unique constraint on `name`)
    pub async fn create(
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO units (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await
    }

    /// Update a unit's name and description
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            UPDATE units
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await
    }

    /// Delete a unit, clearing the unit reference on its members
    ///
    /// Members are never deleted with their unit; their `unit_id` is
    /// set to NULL first.
    ///
    /// # Errors
    ///
    /// Returns an error if either database operation fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        User::clear_unit(pool, id).await?;

        let result = sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
