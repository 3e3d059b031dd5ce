//! Debounced typeahead search over the directory.
//!
//! [`PeopleSearch`] turns raw keystrokes into at most one well-formed remote
//! lookup per quiet period, presents the results, and lets the host commit
//! to exactly one selection. It owns no I/O: the host (see [`driver`]) asks
//! it what to dispatch via [`PeopleSearch::poll`] and feeds completions back
//! through [`PeopleSearch::resolve`]. All mutation happens on the owner's
//! task, run-to-completion per event.
//!
//! Every dispatched lookup carries a generation tag. Only the lookup
//! belonging to the current settled query may update the widget; anything
//! older is discarded silently at resolution time, so correctness never
//! depends on cancelling an in-flight request.

pub mod driver;

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::directory::DirectoryRecord;
use crate::error::RemoteError;

/// Minimum settled length before a query reaches the directory. Shorter
/// text would scan far too broadly.
pub const MIN_QUERY_LEN: usize = 2;

/// Upper bound on presented candidates, also the requested page size.
pub const MAX_CANDIDATES: usize = 10;

/// Generic failure text for the rendered state. The underlying cause goes to
/// the log, never into the widget.
const SEARCH_FAILED_MESSAGE: &str = "Search is unavailable right now. Try again in a moment.";

/// Display state of the search widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    Error,
}

/// A lookup the host must dispatch, tagged with the generation that will be
/// checked at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub generation: u64,
    pub query: String,
}

/// Search widget state: query text, in-flight lifecycle, result set,
/// selection, and display status.
///
/// One logical instance per rendered widget; destroyed with it. Dropping the
/// widget drops the debounce deadline and retires every outstanding
/// generation, so nothing can mutate freed state later.
#[derive(Debug)]
pub struct PeopleSearch {
    query_text: String,
    debouncer: Debouncer<String>,
    /// Settled text the newest generation was issued for.
    dispatched_query: String,
    candidates: Vec<DirectoryRecord>,
    selected: Option<DirectoryRecord>,
    status: SearchStatus,
    last_error: Option<String>,
    /// Tag of the only lookup whose resolution is still welcome.
    generation: u64,
}

impl PeopleSearch {
    pub fn new() -> Self {
        Self::with_debounce(crate::debounce::DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(delay: Duration) -> Self {
        Self {
            query_text: String::new(),
            debouncer: Debouncer::with_delay(String::new(), delay),
            dispatched_query: String::new(),
            candidates: Vec::new(),
            selected: None,
            status: SearchStatus::Idle,
            last_error: None,
            generation: 0,
        }
    }

    /// Record a keystroke. Never searches by itself; dispatch decisions
    /// happen in [`poll`](Self::poll) once the text settles.
    pub fn set_query(&mut self, text: &str) {
        self.query_text = text.to_string();
    }

    /// Advance the widget clock: settle the query text and decide whether a
    /// lookup must be dispatched. Returns at most one ticket per settled
    /// change.
    pub fn poll(&mut self, now: Instant) -> Option<LookupTicket> {
        let settled = self
            .debouncer
            .observe(self.query_text.clone(), now)
            .clone();

        // A held selection suppresses searching entirely.
        if self.selected.is_some() {
            return None;
        }

        if settled.chars().count() < MIN_QUERY_LEN {
            // Short text forces idle regardless of prior state, and retires
            // any in-flight generation so a late resolution cannot land.
            if settled != self.dispatched_query {
                self.dispatched_query = settled;
                self.generation += 1;
            }
            self.status = SearchStatus::Idle;
            self.last_error = None;
            self.candidates.clear();
            return None;
        }

        if settled != self.dispatched_query {
            self.dispatched_query = settled.clone();
            self.generation += 1;
            self.status = SearchStatus::Searching;
            self.last_error = None;
            return Some(LookupTicket {
                generation: self.generation,
                query: settled,
            });
        }

        None
    }

    /// Apply a lookup completion. Resolutions tagged with a superseded
    /// generation are discarded (the staleness rule).
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<Vec<DirectoryRecord>, RemoteError>,
    ) {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                "discarding superseded lookup resolution"
            );
            return;
        }
        // A selection committed while the lookup was in flight wins.
        if self.selected.is_some() {
            return;
        }

        match outcome {
            Ok(mut records) => {
                records.truncate(MAX_CANDIDATES);
                self.candidates = records;
                self.status = SearchStatus::Idle;
                self.last_error = None;
            }
            Err(cause) => {
                warn!(query = %self.dispatched_query, error = %cause, "people lookup failed");
                self.candidates.clear();
                self.status = SearchStatus::Error;
                self.last_error = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Commit to one record. Candidates clear, the query text becomes the
    /// record's display text, and searching stays suppressed until
    /// [`clear`](Self::clear).
    pub fn select(&mut self, record: DirectoryRecord) {
        self.query_text = record.display_text().to_string();
        self.debouncer.reset(self.query_text.clone());
        self.dispatched_query = self.query_text.clone();
        self.generation += 1;
        self.candidates.clear();
        self.status = SearchStatus::Idle;
        self.last_error = None;
        self.selected = Some(record);
    }

    /// Drop the selection and return to the initial widget state. Clearing
    /// itself never triggers a search.
    pub fn clear(&mut self) {
        self.query_text.clear();
        self.debouncer.reset(String::new());
        self.dispatched_query.clear();
        self.generation += 1;
        self.candidates.clear();
        self.status = SearchStatus::Idle;
        self.last_error = None;
        self.selected = None;
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn settled_query(&self) -> &str {
        self.debouncer.settled()
    }

    pub fn candidates(&self) -> &[DirectoryRecord] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&DirectoryRecord> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for PeopleSearch {
    fn default() -> Self {
        Self::new()
    }
}
