//! Events panel markup.
//!
//! Everything that knows the page's ids and class names lives here.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::EventEntry;

const PANEL: &str = "#events-panel";
const RESERVATION: &str = ".Consumer-reservation";
const HEADING: &str = ".Consumer-reservationHeading";
const HINT: &str = ".Consumer-reservationHint";
const HINT_COUNT: &str = "span";
const META_LIST: &str = ".Consumer-reservationMetaList";
const META_ITEM: &str = "li";

struct Selectors {
    panel: Selector,
    reservation: Selector,
    heading: Selector,
    hint: Selector,
    hint_count: Selector,
    meta_list: Selector,
    meta_item: Selector,
}

impl Selectors {
    fn new() -> Self {
        // All selectors are literals above.
        let parse = |s: &str| Selector::parse(s).expect("static selector");
        Self {
            panel: parse(PANEL),
            reservation: parse(RESERVATION),
            heading: parse(HEADING),
            hint: parse(HINT),
            hint_count: parse(HINT_COUNT),
            meta_list: parse(META_LIST),
            meta_item: parse(META_ITEM),
        }
    }
}

/// Extract the listed events from a page's HTML.
///
/// Returns `None` when there is no events panel at all, which covers a
/// changed page layout, a venue with nothing scheduled, and a page that
/// failed to render.
pub fn parse_events(html: &str) -> Option<Vec<EventEntry>> {
    let sel = Selectors::new();
    let document = Html::parse_document(html);

    let panel = document.select(&sel.panel).next()?;

    let entries: Vec<EventEntry> = panel
        .select(&sel.reservation)
        .filter_map(|reservation| parse_entry(&sel, reservation))
        .collect();

    debug!(count = entries.len(), "Parsed events panel");
    Some(entries)
}

fn parse_entry(sel: &Selectors, reservation: ElementRef<'_>) -> Option<EventEntry> {
    let Some(name) = reservation
        .select(&sel.heading)
        .next()
        .map(element_text)
        .filter(|name| !name.is_empty())
    else {
        warn!("Reservation without a heading, skipping");
        return None;
    };

    let tickets = reservation.select(&sel.hint).next().map(|hint| {
        hint.select(&sel.hint_count)
            .next()
            .map(element_text)
            .unwrap_or_else(|| element_text(hint))
    });

    let details = reservation
        .select(&sel.meta_list)
        .next()
        .map(|list| list.select(&sel.meta_item).map(element_text).collect())
        .unwrap_or_default();

    Some(EventEntry {
        name,
        tickets,
        details,
    })
}

/// Rendered text of an element, whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
