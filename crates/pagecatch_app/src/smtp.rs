use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use pagecatch_logging::{catch_debug, catch_error};
use thiserror::Error;

use crate::config::MailConfig;
use crate::notify::Notifier;

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("mail settings are incomplete (user, password and to are required)")]
    Incomplete,
    #[error("invalid mail address {address:?}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sender and recipients resolved from [`MailConfig`]; `from` falls back to `user`.
#[derive(Debug, Clone)]
pub struct Envelope {
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl Envelope {
    pub fn from_config(settings: &MailConfig) -> Result<Self, SmtpError> {
        if !settings.is_complete() {
            return Err(SmtpError::Incomplete);
        }
        let sender = settings
            .from
            .as_deref()
            .filter(|from| !from.trim().is_empty())
            .or(settings.user.as_deref())
            .ok_or(SmtpError::Incomplete)?;
        let from = parse_mailbox(sender)?;
        let to = settings
            .to
            .iter()
            .map(|address| parse_mailbox(address))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { from, to })
    }

    /// Plain-text UTF-8 message with the current local date.
    pub fn message(&self, subject: &str, body: &str) -> Result<Message, SmtpError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .date_now()
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        Ok(builder.body(body.to_string())?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SmtpError> {
    address.trim().parse().map_err(|source| SmtpError::Address {
        address: address.to_string(),
        source,
    })
}

/// Report delivery over SMTP with STARTTLS and login.
pub struct SmtpNotifier {
    envelope: Envelope,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    pub fn new(settings: &MailConfig) -> Result<Self, SmtpError> {
        let envelope = Envelope::from_config(settings)?;
        let (Some(user), Some(password)) = (settings.user.clone(), settings.password.clone())
        else {
            return Err(SmtpError::Incomplete);
        };
        let transport = SmtpTransport::starttls_relay(&settings.smtp_server)?
            .port(settings.smtp_port)
            .credentials(Credentials::new(user, password))
            .build();
        Ok(Self {
            envelope,
            transport,
        })
    }
}

impl Notifier for SmtpNotifier {
    fn deliver(&self, subject: &str, body: &str) -> bool {
        let message = match self.envelope.message(subject, body) {
            Ok(message) => message,
            Err(err) => {
                catch_error!("Failed to build report mail: {err}");
                return false;
            }
        };
        match self.transport.send(&message) {
            Ok(response) => {
                catch_debug!("SMTP server accepted report: {:?}", response.code());
                true
            }
            Err(err) => {
                catch_error!("Failed to send report mail: {err}");
                false
            }
        }
    }
}
