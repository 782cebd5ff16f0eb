//! Transactional e-mail.
//!
//! [`Mailer`] sends one message; [`ResendClient`] is the production
//! implementation and [`DisabledMailer`] stands in when no API key is set.

mod resend;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

pub use resend::{ResendClient, ResendConfig};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    /// Blind-copy the event admin address, when one is configured.
    #[serde(skip)]
    pub copy_admin: bool,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Drops every message. Used when `RESEND_API_KEY` is not configured.
#[derive(Debug, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        debug!(subject = %email.subject, "E-mail disabled, message dropped");
        Ok(())
    }
}
