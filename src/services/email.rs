use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("smtp transport: {0}")]
    Transport(String),
}

/// Best-effort outbound email. Failures are for the caller to log, never to
/// propagate into reminder bookkeeping.
#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

pub(crate) struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let email = settings.email();

        let from = format!("{} <{}>", email.from_name, email.from_address)
            .parse::<Mailbox>()
            .map_err(|err| anyhow::anyhow!("invalid EMAIL_FROM_ADDRESS: {err}"))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&email.smtp_host)?.port(email.smtp_port);
        if !email.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                email.smtp_username.clone(),
                email.smtp_password.clone(),
            ));
        }

        Ok(Self { transport: builder.build(), from })
    }
}

#[async_trait]
impl EmailSink for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let to = to.parse::<Mailbox>().map_err(|err| EmailError::Address(err.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|err| EmailError::Build(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| EmailError::Transport(err.to_string()))?;

        Ok(())
    }
}

/// Stands in when email delivery is switched off; reminders still produce
/// in-app notifications.
pub(crate) struct DisabledMailer;

#[async_trait]
impl EmailSink for DisabledMailer {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), EmailError> {
        tracing::debug!(to, subject, "Email delivery disabled; dropping message");
        Ok(())
    }
}

pub(crate) fn mailer_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn EmailSink>> {
    if !settings.email().enabled {
        return Ok(Arc::new(DisabledMailer));
    }
    Ok(Arc::new(SmtpMailer::from_settings(settings)?))
}
