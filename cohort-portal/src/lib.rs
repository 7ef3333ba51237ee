//! cohort-portal: admin portal for intern rosters, units, and bulk
//! email campaigns
//!
//! A single-tenant JSON API consumed by a separate admin SPA. It
//! manages user accounts ("interns"), organizes them into named
//! units, and sends templated bulk email campaigns to filtered
//! recipient sets through an SMTP relay.
//!
//! # Architecture
//!
//! - `models` — users and units over Postgres (sqlx)
//! - `roster` — free-text bulk roster parsing
//! - `campaign` — recipient selection, per-recipient templating, and
//!   the sequential dispatch loop
//! - `email` — message builder, `EmailSender` trait, SMTP backend
//!   over a process-scoped transport
//! - `storage` — attachment validation and temp staging
//! - `auth` — argon2id passwords, JWT access tokens, rotating refresh
//!   tokens
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cohort_portal::{
//!     config::AppConfig, email::SmtpMailer, observability, routes, state::AppState,
//! };
//! use sqlx::postgres::PgPoolOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     observability::init()?;
//!
//!     let config = AppConfig::load()?;
//!     let pool = PgPoolOptions::new().connect(&config.database.url).await?;
//!     let mailer = Arc::new(SmtpMailer::connect(&config.smtp)?);
//!
//!     let state = AppState::new(config, pool, mailer)?;
//!     let app = routes::router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod campaign;
pub mod config;
pub mod email;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod roster;
pub mod routes;
pub mod state;
pub mod storage;

// Test utilities (mock email sender)
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types

    pub use crate::auth::{AdminClaims, TokenService};
    pub use crate::campaign::{CampaignContent, CampaignOutcome, Recipient};
    pub use crate::config::AppConfig;
    pub use crate::email::{Email, EmailError, EmailSender, SmtpMailer};
    pub use crate::error::ApiError;
    pub use crate::models::{Unit, User};
    pub use crate::state::AppState;
    pub use crate::storage::{AttachmentStore, UploadedFile};

    // Convenience for JSON responses
    pub use serde_json::json;
}
