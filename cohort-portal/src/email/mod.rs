//! Email sending
//!
//! This module provides the email subsystem for campaign dispatch:
//! - A message builder with HTML bodies and staged-file attachments
//! - The [`EmailSender`] trait the dispatch loop depends on
//! - An SMTP backend over a process-scoped `lettre` transport
//!
//! # Examples
//!
//! ```rust,no_run
//! use cohort_portal::config::SmtpSettings;
//! use cohort_portal::email::{Email, EmailSender, SmtpMailer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = SmtpMailer::connect(&SmtpSettings::default())?;
//!
//! let email = Email::new()
//!     .to("user@example.com")
//!     .from("noreply@myapp.com")
//!     .subject("Welcome!")
//!     .html("<h1>Welcome to our app!</h1>");
//!
//! mailer.send(email).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod sender;
mod smtp;

pub use error::EmailError;
pub use message::{Email, EmailAttachment};
pub use sender::EmailSender;
pub use smtp::SmtpMailer;
