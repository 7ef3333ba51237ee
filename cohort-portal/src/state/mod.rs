//! Application state
//!
//! One `AppState` is built at startup and cloned into every handler.
//! It owns the process-scoped resources: configuration, the database
//! pool, the SMTP mailer (behind the [`EmailSender`] trait), the
//! token service, and the attachment staging area.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::TokenService, config::AppConfig, email::EmailSender, storage::AttachmentStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    db: PgPool,
    mailer: Arc<dyn EmailSender>,
    tokens: Arc<TokenService>,
    attachments: AttachmentStore,
}

impl AppState {
    /// Assemble application state from its startup resources
    ///
    /// # Errors
    ///
    /// Returns an error if the JWT secret is missing or the upload
    /// directory path is unusable.
    pub fn new(
        config: AppConfig,
        db: PgPool,
        mailer: Arc<dyn EmailSender>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenService::from_settings(&config.auth)?;
        let attachments = AttachmentStore::new(config.uploads.dir.clone())?;

        Ok(Self {
            config: Arc::new(config),
            db,
            mailer,
            tokens: Arc::new(tokens),
            attachments,
        })
    }

    /// Get configuration reference
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the database pool
    #[must_use]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get the email sender
    #[must_use]
    pub fn mailer(&self) -> &Arc<dyn EmailSender> {
        &self.mailer
    }

    /// Get the token service
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get the attachment staging area
    #[must_use]
    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }
}
