//! Email error types

use thiserror::Error;

/// Errors that can occur when working with emails
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no recipients
    #[error("email must have at least one recipient")]
    NoRecipients,

    /// Email has no sender
    #[error("email must have a from address")]
    NoSender,

    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no body content
    #[error("email must have HTML content")]
    NoContent,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Invalid attachment content type
    #[error("invalid attachment content type: {0}")]
    InvalidContentType(String),

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// Email configuration error
    #[error("email configuration error: {0}")]
    ConfigError(String),

    /// I/O error (reading staged attachments)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EmailError {
    /// Create an SMTP error from a string message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::SmtpError(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::ConfigError(msg.into())
    }
}
