//! Alert mail.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::AlertConfig;
use crate::error::MonitorError;

/// A composed alert, ready to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Fill the fixed alert template for `failure`.
    pub fn compose(failure: &str, config: &AlertConfig) -> Self {
        let body = format!(
            "An error has occurred with the NFS share on {origin}:\n\
             \n\
             {failure}\n\
             \n\
             Please contact {contacts} ASAP\n\
             \n\
             Thank you,\n\
             {signature}",
            origin = config.origin,
            failure = failure,
            contacts = config.contacts,
            signature = config.signature,
        );

        Self {
            subject: config.subject.clone(),
            body,
        }
    }
}

/// Delivers alerts.
#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<(), MonitorError>;
}

/// Plaintext alert over SMTP with STARTTLS.
pub struct SmtpAlertSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
}

impl SmtpAlertSender {
    /// Build the sender. Addresses are parsed on each send so a bad address
    /// surfaces as a delivery failure after remediation, not at startup.
    /// No connection is made until the first send.
    pub fn new(config: &AlertConfig) -> Result<Self, MonitorError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let Some((username, password)) = config.credentials() {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }
}

#[async_trait]
impl AlertSender for SmtpAlertSender {
    async fn send(&self, message: &AlertMessage) -> Result<(), MonitorError> {
        let from = parse_mailbox(&self.from)?;
        let to = parse_mailbox(&self.to)?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;

        self.transport.send(email).await?;

        info!(to = %self.to, subject = %message.subject, "Alert sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MonitorError> {
    address.parse().map_err(|source| MonitorError::Address {
        address: address.to_string(),
        source,
    })
}
