//! Email message builder

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::EmailError;

/// A file attached to an outgoing email
///
/// Attachments reference staged files on disk; the transport reads
/// the bytes at send time so the same staged file can back several
/// per-recipient sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAttachment {
    /// Filename shown to the recipient (the original upload name)
    pub filename: String,

    /// MIME content type
    pub content_type: String,

    /// Path of the staged file on disk
    pub path: PathBuf,
}

/// An outgoing email message
///
/// Use the builder pattern to construct emails:
///
/// ```rust
/// use cohort_portal::email::Email;
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Welcome!")
///     .html("<h1>Welcome!</h1>");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Email {
    /// Email recipients (To)
    pub to: Vec<String>,

    /// Email sender (From)
    pub from: Option<String>,

    /// Email subject
    pub subject: Option<String>,

    /// HTML body
    pub html: Option<String>,

    /// File attachments
    pub attachments: Vec<EmailAttachment>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient (To)
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Set the sender (From)
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Set the email subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    /// Add a file attachment
    #[must_use]
    pub fn attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Add several file attachments
    #[must_use]
    pub fn attachments(mut self, attachments: &[EmailAttachment]) -> Self {
        self.attachments.extend_from_slice(attachments);
        self
    }

    /// Validate the email
    ///
    /// Checks that all required fields are present.
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - No recipients
    /// - No sender
    /// - No subject
    /// - No HTML content
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        if self.from.is_none() {
            return Err(EmailError::NoSender);
        }

        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }

        if self.html.is_none() {
            return Err(EmailError::NoContent);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> EmailAttachment {
        EmailAttachment {
            filename: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            path: PathBuf::from("/tmp/attachment-x.pdf"),
        }
    }

    #[test]
    fn builder_collects_fields() {
        let email = Email::new()
            .to("user@example.com")
            .from("noreply@myapp.com")
            .subject("Test")
            .html("<p>Hello</p>")
            .attachment(attachment());

        assert_eq!(email.to, vec!["user@example.com"]);
        assert_eq!(email.from, Some("noreply@myapp.com".to_string()));
        assert_eq!(email.subject, Some("Test".to_string()));
        assert_eq!(email.attachments.len(), 1);
    }

    #[test]
    fn validation_requires_recipient() {
        let email = Email::new()
            .from("noreply@myapp.com")
            .subject("Test")
            .html("<p>Hello</p>");

        assert!(matches!(email.validate(), Err(EmailError::NoRecipients)));
    }

    #[test]
    fn validation_requires_sender() {
        let email = Email::new()
            .to("user@example.com")
            .subject("Test")
            .html("<p>Hello</p>");

        assert!(matches!(email.validate(), Err(EmailError::NoSender)));
    }

    #[test]
    fn validation_requires_subject() {
        let email = Email::new()
            .to("user@example.com")
            .from("noreply@myapp.com")
            .html("<p>Hello</p>");

        assert!(matches!(email.validate(), Err(EmailError::NoSubject)));
    }

    #[test]
    fn validation_requires_html_body() {
        let email = Email::new()
            .to("user@example.com")
            .from("noreply@myapp.com")
            .subject("Test");

        assert!(matches!(email.validate(), Err(EmailError::NoContent)));
    }

    #[test]
    fn validation_accepts_complete_email() {
        let email = Email::new()
            .to("user@example.com")
            .from("noreply@myapp.com")
            .subject("Test")
            .html("<p>Hello</p>");

        assert!(email.validate().is_ok());
    }
}
