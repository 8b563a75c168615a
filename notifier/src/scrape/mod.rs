//! Fetching raw event records from the reservation page.

pub mod browser;
pub mod page;

pub use browser::BrowserSource;

use crate::error::Error;

/// One event listed in the events panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub name: String,
    /// Remaining-tickets text. `None` when the listing has no reservation hint.
    pub tickets: Option<String>,
    /// Date, time, venue and similar lines, in page order.
    pub details: Vec<String>,
}

/// Source of scraped event listings.
pub trait EventSource {
    /// Returns `Ok(None)` when the page has no events panel.
    fn fetch_events(&mut self) -> Result<Option<Vec<EventEntry>>, Error>;
}
