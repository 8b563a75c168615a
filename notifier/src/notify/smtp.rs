//! Email delivery over authenticated STARTTLS SMTP.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use super::{Notifier, SUBJECT};
use crate::config::SmtpSettings;
use crate::error::Error;

/// Sends reports through an SMTP relay such as Amazon SES.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    settings: SmtpSettings,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_message(&self, body: &str) -> Result<Message, Error> {
        let message = Message::builder()
            .from(self.settings.sender.parse::<Mailbox>()?)
            .to(self.settings.recipient.parse::<Mailbox>()?)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    /// One connection per call: connect, STARTTLS, login, send, quit.
    /// A failed connect leaves no session behind.
    fn send(&self, body: &str) -> Result<(), Error> {
        let message = self.build_message(body)?;

        let transport = SmtpTransport::starttls_relay(&self.settings.endpoint)?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ))
            .build();

        debug!(
            endpoint = %self.settings.endpoint,
            port = self.settings.port,
            "Connecting to SMTP relay"
        );
        transport.send(&message)?;

        info!("Email Sent to {}", self.settings.recipient);
        Ok(())
    }
}
