//! Email sender trait abstraction

use async_trait::async_trait;

use super::{Email, EmailError};

/// Trait for sending emails
///
/// Implemented by the SMTP backend and by the in-memory mock used in
/// tests. The campaign dispatch loop only ever sees this trait, so
/// sending is swappable without touching campaign logic.
///
/// # Examples
///
/// ```rust,no_run
/// use cohort_portal::config::SmtpSettings;
/// use cohort_portal::email::{Email, EmailSender, SmtpMailer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = SmtpMailer::connect(&SmtpSettings::default())?;
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Hello!")
///     .html("<p>Hello, World!</p>");
///
/// mailer.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email cannot be sent or is invalid
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
