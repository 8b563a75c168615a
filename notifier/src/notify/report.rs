//! Plain-text report body.

use crate::scrape::EventEntry;

/// Accumulates one block per newly found event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    body: String,
    events: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` as its name, a ticket line, one line per detail,
    /// then a blank separator.
    pub fn push(&mut self, event: &EventEntry, tickets: &str) {
        self.body.push_str(&event.name);
        self.body.push('\n');

        self.body.push_str("* ");
        self.body.push_str(tickets);
        self.body.push('\n');

        for detail in &event.details {
            self.body.push_str("* ");
            self.body.push_str(detail);
            self.body.push('\n');
        }

        self.body.push_str("\n\n");
        self.events += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Number of events in the report.
    pub fn len(&self) -> usize {
        self.events
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
