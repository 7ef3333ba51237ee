//! SMTP backend for sending emails
//!
//! Uses the `lettre` crate to send emails via an SMTP relay. The
//! transport is built once from [`SmtpSettings`] and shared for the
//! lifetime of the process; individual sends reuse its connection
//! pool instead of reconnecting per message.

use async_trait::async_trait;
use lettre::{
    message::{header, Attachment, Body, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpSettings;

use super::{Email, EmailAttachment, EmailError, EmailSender};

/// SMTP email backend
///
/// Holds the process-scoped `lettre` transport. Construct one at
/// startup and inject it into application state behind the
/// [`EmailSender`] trait.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport from SMTP settings
    ///
    /// # Errors
    ///
    /// Returns `EmailError::ConfigError` if the relay host is empty,
    /// or an SMTP error if TLS parameters cannot be constructed.
    pub fn connect(settings: &SmtpSettings) -> Result<Self, EmailError> {
        if settings.host.is_empty() {
            return Err(EmailError::config("SMTP host must be configured"));
        }

        let credentials =
            Credentials::new(settings.username.clone(), settings.password.clone());

        let mut builder = if settings.use_starttls {
            let tls_parameters = TlsParameters::new(settings.host.clone())
                .map_err(|e| EmailError::smtp(format!("TLS parameters error: {e}")))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| EmailError::smtp(e.to_string()))?
                .credentials(credentials)
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .credentials(credentials)
        };

        builder = builder.port(settings.port);

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Build a lettre `Message` from an [`Email`]
    ///
    /// Attachment bytes are read from their staged paths here, so a
    /// missing staged file fails the individual send rather than the
    /// whole campaign.
    async fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let from_addr = email.from.as_ref().ok_or(EmailError::NoSender)?;
        let from: Mailbox = from_addr
            .parse()
            .map_err(|_| EmailError::InvalidAddress(from_addr.clone()))?;

        let mut builder = Message::builder().from(from);

        for to_addr in &email.to {
            let to: Mailbox = to_addr
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to_addr.clone()))?;
            builder = builder.to(to);
        }

        let subject = email.subject.as_ref().ok_or(EmailError::NoSubject)?;
        builder = builder.subject(subject);

        let html = email.html.as_ref().ok_or(EmailError::NoContent)?;
        let html_part = SinglePart::builder()
            .header(header::ContentType::TEXT_HTML)
            .body(html.clone());

        let message = if email.attachments.is_empty() {
            builder
                .singlepart(html_part)
                .map_err(|e| EmailError::smtp(e.to_string()))?
        } else {
            let mut multipart = MultiPart::mixed().singlepart(html_part);
            for attachment in &email.attachments {
                multipart = multipart.singlepart(Self::build_attachment(attachment).await?);
            }
            builder
                .multipart(multipart)
                .map_err(|e| EmailError::smtp(e.to_string()))?
        };

        Ok(message)
    }

    async fn build_attachment(attachment: &EmailAttachment) -> Result<SinglePart, EmailError> {
        let data = tokio::fs::read(&attachment.path).await?;

        let content_type = header::ContentType::parse(&attachment.content_type)
            .map_err(|_| EmailError::InvalidContentType(attachment.content_type.clone()))?;

        Ok(Attachment::new(attachment.filename.clone()).body(Body::new(data), content_type))
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let message = Self::build_message(&email).await?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailError::smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_empty_host() {
        let settings = SmtpSettings {
            host: String::new(),
            ..SmtpSettings::default()
        };

        assert!(matches!(
            SmtpMailer::connect(&settings),
            Err(EmailError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn connect_builds_transport() {
        let settings = SmtpSettings {
            host: "smtp.example.com".to_string(),
            username: "mailer".to_string(),
            password: "secret".to_string(),
            ..SmtpSettings::default()
        };

        assert!(SmtpMailer::connect(&settings).is_ok());
    }

    #[tokio::test]
    async fn build_message_without_attachments() {
        let email = Email::new()
            .to("recipient@example.com")
            .from("sender@example.com")
            .subject("Test Email")
            .html("<p>This is a test email</p>");

        let message = SmtpMailer::build_message(&email).await;
        assert!(message.is_ok());
    }

    #[tokio::test]
    async fn build_message_rejects_bad_recipient_address() {
        let email = Email::new()
            .to("not an address")
            .from("sender@example.com")
            .subject("Test Email")
            .html("<p>body</p>");

        let result = SmtpMailer::build_message(&email).await;
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn build_message_with_attachment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("attachment-test.pdf");
        tokio::fs::write(&path, b"%PDF-1.4 test")
            .await
            .expect("write staged file");

        let email = Email::new()
            .to("recipient@example.com")
            .from("sender@example.com")
            .subject("Test Email")
            .html("<p>body</p>")
            .attachment(EmailAttachment {
                filename: "report.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                path,
            });

        let message = SmtpMailer::build_message(&email).await;
        assert!(message.is_ok());
    }

    #[tokio::test]
    async fn build_message_fails_on_missing_staged_file() {
        let email = Email::new()
            .to("recipient@example.com")
            .from("sender@example.com")
            .subject("Test Email")
            .html("<p>body</p>")
            .attachment(EmailAttachment {
                filename: "ghost.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                path: std::path::PathBuf::from("/nonexistent/ghost.pdf"),
            });

        let result = SmtpMailer::build_message(&email).await;
        assert!(matches!(result, Err(EmailError::IoError(_))));
    }
}
