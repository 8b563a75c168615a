//! One pass: scrape the page, report new events, send the email.

use tracing::{debug, error, info};

use crate::diff;
use crate::notify::Notifier;
use crate::scrape::EventSource;
use crate::store::EventStore;

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Events newly reported (and recorded) this run.
    pub reported: usize,
    /// Whether the notification email went out.
    pub delivered: bool,
}

/// Run the check.
///
/// Scrape and delivery failures are logged and swallowed. Events are
/// recorded as reported before the email is sent, so a failed delivery
/// does not bring them back next run.
pub fn run(
    store: &mut EventStore,
    source: &mut impl EventSource,
    notifier: &impl Notifier,
    run_started: &str,
) -> Outcome {
    info!("--- Starting event check ---");
    debug!(known = store.known(), "Previously reported events");

    let events = match source.fetch_events() {
        Ok(Some(events)) => events,
        Ok(None) => {
            info!("No Events Found");
            Vec::new()
        }
        Err(e) => {
            error!(error = %e, "Failed to scrape events page");
            Vec::new()
        }
    };

    let report = diff::report_new_events(&events, store, run_started);

    if report.is_empty() {
        info!("Nothing new to report");
        return Outcome {
            reported: 0,
            delivered: false,
        };
    }

    debug!("Sending Email Message: {}", report.body());

    let delivered = match notifier.send(report.body()) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Failed to send notification email");
            false
        }
    };

    Outcome {
        reported: report.len(),
        delivered,
    }
}
