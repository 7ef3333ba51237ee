//! Campaign dispatch loop
//!
//! Sends one email per resolved recipient, sequentially, on the
//! request task. A failed send is tallied and recorded but never
//! aborts the loop or rolls back earlier sends; there are no retries.

use serde::Serialize;

use crate::email::{Email, EmailAttachment, EmailSender};

use super::{
    recipients::Recipient,
    template::{render_campaign, TemplateVars},
};

/// Subject, header title, and body template for one campaign
#[derive(Debug, Clone)]
pub struct CampaignContent {
    /// Email subject
    pub subject: String,

    /// Branded header title (blank falls back to the subject)
    pub header_title: String,

    /// Body template with `{{...}}` tokens
    pub body: String,
}

/// Tally of one dispatch run
#[derive(Debug, Default, Serialize)]
pub struct CampaignOutcome {
    /// Emails handed to the transport successfully
    pub sent: u32,

    /// Emails the transport rejected
    pub failed: u32,

    /// One human-readable entry per failed recipient
    pub errors: Vec<String>,
}

/// Send a campaign to every resolved recipient
///
/// Each recipient gets an individually rendered document. Attachments
/// are shared across all sends; staged files must outlive this call
/// and are discarded by the caller afterwards.
pub async fn dispatch_campaign(
    mailer: &dyn EmailSender,
    from: &str,
    content: &CampaignContent,
    recipients: &[Recipient],
    attachments: &[EmailAttachment],
) -> CampaignOutcome {
    let mut outcome = CampaignOutcome::default();

    for recipient in recipients {
        let vars = TemplateVars::for_recipient(recipient);
        let html = render_campaign(&content.subject, &content.header_title, &content.body, &vars);

        let email = Email::new()
            .to(&recipient.email)
            .from(from)
            .subject(&content.subject)
            .html(&html)
            .attachments(attachments);

        match mailer.send(email).await {
            Ok(()) => outcome.sent += 1,
            Err(error) => {
                outcome.failed += 1;
                outcome
                    .errors
                    .push(format!("Failed to send to {}: {error}", recipient.email));
                tracing::error!(
                    recipient = %recipient.email,
                    %error,
                    "failed to send campaign email"
                );
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEmailSender;
    use uuid::Uuid;

    fn recipient(name: &str, email: &str, unit: Option<&str>) -> Recipient {
        Recipient {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role: "user".to_string(),
            unit: unit.map(str::to_string),
            is_approved: true,
        }
    }

    fn content() -> CampaignContent {
        CampaignContent {
            subject: "Welcome".to_string(),
            header_title: "Welcome Aboard".to_string(),
            body: "Hello {{name}}, your unit is {{unit}}.".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_one_email_per_recipient() {
        let mock = MockEmailSender::new();
        let recipients = vec![
            recipient("Jane", "jane@x.com", Some("Engineering")),
            recipient("Bob", "bob@x.com", None),
        ];

        let outcome =
            dispatch_campaign(&mock, "noreply@portal.test", &content(), &recipients, &[]).await;

        assert_eq!(outcome.sent, 2);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.errors.is_empty());
        assert!(mock.was_sent_to("jane@x.com"));
        assert!(mock.was_sent_to("bob@x.com"));
    }

    #[tokio::test]
    async fn renders_per_recipient_content() {
        let mock = MockEmailSender::new();
        let recipients = vec![
            recipient("Jane", "jane@x.com", Some("Engineering")),
            recipient("Bob", "bob@x.com", None),
        ];

        dispatch_campaign(&mock, "noreply@portal.test", &content(), &recipients, &[]).await;

        let emails = mock.sent_emails();
        let jane_html = emails[0].html.as_deref().expect("html body");
        let bob_html = emails[1].html.as_deref().expect("html body");

        assert!(jane_html.contains("Hello Jane, your unit is Engineering."));
        assert!(bob_html.contains("Hello Bob, your unit is N/A."));
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_loop() {
        let mock = MockEmailSender::new();
        mock.fail_when_sending_to("second@x.com");

        let recipients = vec![
            recipient("First", "first@x.com", None),
            recipient("Second", "second@x.com", None),
            recipient("Third", "third@x.com", None),
        ];

        let outcome =
            dispatch_campaign(&mock, "noreply@portal.test", &content(), &recipients, &[]).await;

        assert_eq!(outcome.sent, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Failed to send to second@x.com:"));

        // The third recipient was still attempted
        assert!(mock.was_sent_to("third@x.com"));
    }

    #[tokio::test]
    async fn all_failures_still_report() {
        let mock = MockEmailSender::new();
        mock.fail_when_sending_to("a@x.com");
        mock.fail_when_sending_to("b@x.com");

        let recipients = vec![
            recipient("A", "a@x.com", None),
            recipient("B", "b@x.com", None),
        ];

        let outcome =
            dispatch_campaign(&mock, "noreply@portal.test", &content(), &recipients, &[]).await;

        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[tokio::test]
    async fn empty_recipient_set_sends_nothing() {
        let mock = MockEmailSender::new();

        let outcome =
            dispatch_campaign(&mock, "noreply@portal.test", &content(), &[], &[]).await;

        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(mock.sent_count(), 0);
    }
}
