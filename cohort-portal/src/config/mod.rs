//! Configuration management
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `COHORT_` prefix, `__` for nesting)
//! 2. `./config.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! Environment variable format: `COHORT_SECTION__FIELD_NAME`
//! - Example: `COHORT_SMTP__HOST=smtp.example.com`
//! - Example: `COHORT_AUTH__JWT_SECRET=...`
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [service]
//! name = "cohort-portal"
//! host = "127.0.0.1"
//! port = 3000
//!
//! [database]
//! url = "postgres://localhost/cohort_portal"
//!
//! [smtp]
//! host = "smtp.example.com"
//! port = 587
//! username = "mailer"
//! password = "secret"
//! from = "Admin Portal <noreply@example.com>"
//!
//! [auth]
//! jwt_secret = "change-me"
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name used in logs
    pub name: String,

    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "cohort-portal".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Postgres connection URL
    pub url: String,

    /// Maximum pool connections
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/cohort_portal".to_string(),
            max_connections: 5,
        }
    }
}

/// SMTP relay settings
///
/// The transport is built once at startup from these settings and
/// shared for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS, 465 for TLS)
    pub port: u16,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Sender address for all outgoing mail
    pub from: String,

    /// Use STARTTLS (default: true)
    pub use_starttls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: "Admin Portal <noreply@localhost>".to_string(),
            use_starttls: true,
        }
    }
}

/// Token issuance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret for signing access and refresh tokens
    ///
    /// Must be set to a non-empty value before the service will start.
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_secs: 900,           // 15 minutes
            refresh_ttl_secs: 7 * 86400,    // 7 days
        }
    }
}

/// Attachment upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Directory for staged campaign attachments
    pub dir: PathBuf,

    /// Maximum size per attachment in bytes
    pub max_file_bytes: u64,

    /// Maximum number of attachments per campaign
    pub max_files: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./uploads/email-attachments"),
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP service settings
    #[serde(default)]
    pub service: ServiceSettings,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// SMTP relay settings
    #[serde(default)]
    pub smtp: SmtpSettings,

    /// Token issuance settings
    #[serde(default)]
    pub auth: AuthSettings,

    /// Attachment upload settings
    #[serde(default)]
    pub uploads: UploadSettings,
}

impl AppConfig {
    /// Load configuration with the standard layering
    ///
    /// Precedence: defaults, then `./config.toml`, then `COHORT_*`
    /// environment variables (double underscore for nesting).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - `config.toml` cannot be parsed
    /// - Configuration values fail type conversion
    pub fn load() -> anyhow::Result<Self> {
        let mut figment =
            Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed("COHORT_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// values fail type conversion.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed("COHORT_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }
}
