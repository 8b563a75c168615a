//! Composing and delivering the notification email.

pub mod report;
pub mod smtp;

pub use report::Report;
pub use smtp::SmtpNotifier;

use crate::error::Error;

/// Subject line of every notification.
pub const SUBJECT: &str = "Slightly Toasted Event Notification";

/// Delivers a finished report.
pub trait Notifier {
    fn send(&self, body: &str) -> Result<(), Error>;
}
