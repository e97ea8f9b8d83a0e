use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{AlertEmail, Mailer, NotifyError};
use crate::config::SmtpSettings;

/// STARTTLS SMTP delivery with password authentication.
pub struct SmtpMailer {
    sender: Option<Mailbox>,
    transport: Option<SmtpTransport>,
}

impl SmtpMailer {
    /// Build the transport from settings. Missing credentials are not an
    /// error here; every send then fails with `MissingCredentials`.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let (Some(sender), Some(password)) = (&settings.sender, &settings.password) else {
            tracing::warn!("Email credentials not configured, alerts will not be delivered");
            return Ok(Self {
                sender: None,
                transport: None,
            });
        };

        let mailbox = parse_mailbox(sender)?;
        let transport = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(sender.clone(), password.clone()))
            .build();

        tracing::info!(host = %settings.host, port = settings.port, "SMTP mailer configured");
        Ok(Self {
            sender: Some(mailbox),
            transport: Some(transport),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    fn build_message(sender: &Mailbox, email: &AlertEmail) -> Result<Message, NotifyError> {
        Message::builder()
            .from(sender.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &AlertEmail) -> Result<(), NotifyError> {
        let (Some(sender), Some(transport)) = (&self.sender, &self.transport) else {
            return Err(NotifyError::MissingCredentials);
        };

        let message = Self::build_message(sender, email)?;
        transport
            .send(&message)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
