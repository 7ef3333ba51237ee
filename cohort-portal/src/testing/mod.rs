//! Testing utilities
//!
//! Provides an in-memory email sender for exercising the campaign
//! dispatch loop without an SMTP relay.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::email::{Email, EmailError, EmailSender};

/// Mock email sender for tests
///
/// Captures sent emails in memory for assertions and can be told to
/// fail for specific recipient addresses.
///
/// # Examples
///
/// ```rust
/// use cohort_portal::email::{Email, EmailSender};
/// use cohort_portal::testing::MockEmailSender;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mock = MockEmailSender::new();
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Test")
///     .html("<p>Hello</p>");
///
/// mock.send(email).await?;
///
/// assert_eq!(mock.sent_count(), 1);
/// assert!(mock.was_sent_to("user@example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    sent: Arc<Mutex<Vec<Email>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl MockEmailSender {
    /// Create a new mock email sender
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `address` fail with an SMTP error
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    pub fn fail_when_sending_to(&self, address: &str) {
        self.failing.lock().unwrap().push(address.to_string());
    }

    /// Get the number of emails sent
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Get all sent emails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    /// Check if an email was sent to a specific address
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .any(|email| email.to.contains(&address.to_string()))
    }

    /// Get the last sent email
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (should never happen in tests)
    #[must_use]
    pub fn last_sent(&self) -> Option<Email> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let rejected = {
            let failing = self.failing.lock().unwrap();
            email.to.iter().any(|to| failing.contains(to))
        };
        if rejected {
            return Err(EmailError::smtp("connection refused"));
        }

        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}
