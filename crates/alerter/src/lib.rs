use crate::error::AlerterError;
use configuration::EmailConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
pub mod error;

/// A client for sending plain-text notification e-mails over SMTP.
pub struct EmailAlerter {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailAlerter {
    /// Creates a new `EmailAlerter`.
    ///
    /// Returns `Ok(None)` if no SMTP server is configured, allowing the system to
    /// run without notifications. Nothing touches the network here.
    pub fn new(config: &EmailConfig) -> Result<Option<Self>, AlerterError> {
        if config.server.is_empty() {
            tracing::debug!("E-mail alerter is not configured (no server).");
            return Ok(None);
        }

        let port: u16 = config
            .port
            .trim()
            .parse()
            .map_err(|_| AlerterError::InvalidPort(config.port.clone()))?;
        let from = parse_mailbox(&config.from)?;
        let to = parse_mailbox(&config.to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();

        Ok(Some(Self { transport, from, to }))
    }

    /// Sends one message to the configured recipient.
    pub async fn send(&self, subject: &str, body: &str) -> Result<(), AlerterError> {
        let message = build_message(self.from.clone(), self.to.clone(), subject, body)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, AlerterError> {
    address.parse().map_err(|source| AlerterError::Address {
        address: address.to_string(),
        source,
    })
}

fn build_message(from: Mailbox, to: Mailbox, subject: &str, body: &str) -> Result<Message, AlerterError> {
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;
    Ok(message)
}

/// Sends a notification e-mail on a best-effort basis.
///
/// Does nothing when no server is configured. Any failure is logged and
/// swallowed: a notification must never abort the caller's work.
pub async fn send_email(config: &EmailConfig, subject: &str, body: &str) {
    let alerter = match EmailAlerter::new(config) {
        Ok(Some(alerter)) => alerter,
        Ok(None) => return,
        Err(e) => {
            tracing::error!(error = %e, "Problem preparing e-mail notification.");
            return;
        }
    };

    match alerter.send(subject, body).await {
        Ok(()) => tracing::info!(%subject, "Email sent."),
        Err(e) => tracing::error!(error = %e, %subject, "Problem sending e-mail notification."),
    }
}
