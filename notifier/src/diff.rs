//! Decide which scraped events are new and worth reporting.

use tracing::{error, info};

use crate::notify::Report;
use crate::scrape::EventEntry;
use crate::store::EventStore;

/// Walk `events` in page order, adding each new event with tickets to the
/// report and recording it in `store` before moving to the next one.
///
/// Events already in the store are skipped before their tickets are looked
/// at. Events without tickets are skipped but not recorded, so they come up
/// again on a later run. If the store cannot be written, the walk stops and
/// the report built so far is returned.
pub fn report_new_events(
    events: &[EventEntry],
    store: &mut EventStore,
    run_started: &str,
) -> Report {
    let mut report = Report::new();

    for event in events {
        if store.contains(&event.name) {
            info!("Skipping: {}", event.name);
            continue;
        }

        let Some(tickets) = event.tickets.as_deref() else {
            info!("No Tickets Remaining for {}, Skipping", event.name);
            continue;
        };

        info!("Found: {}", event.name);
        report.push(event, tickets);

        if let Err(e) = store.record(run_started, &event.name) {
            error!(
                error = %e,
                path = %store.path().display(),
                "Failed to record reported event"
            );
            break;
        }
    }

    report
}
