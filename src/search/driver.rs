//! Async host glue for [`PeopleSearch`].
//!
//! The widget itself is synchronous and single-owner. The driver runs on the
//! host task: each [`SearchDriver::tick`] polls the widget with the real
//! clock, spawns one lookup task per ticket, and drains finished resolutions
//! back into the widget. Lookup tasks only ever send `(generation, outcome)`
//! over the channel; they never touch widget state, so a task whose ticket
//! has been superseded finishes harmlessly and its message is discarded by
//! the staleness check. In-flight requests are not cancelled; dropping the
//! driver closes the channel and the orphaned tasks' sends simply fail.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use super::{LookupTicket, PeopleSearch, MAX_CANDIDATES};
use crate::directory::{DirectoryLookup, DirectoryRecord};
use crate::error::RemoteError;

type Resolution = (u64, Result<Vec<DirectoryRecord>, RemoteError>);

pub struct SearchDriver {
    widget: PeopleSearch,
    lookup: Arc<dyn DirectoryLookup>,
    tx: mpsc::UnboundedSender<Resolution>,
    rx: mpsc::UnboundedReceiver<Resolution>,
    /// Lookups dispatched but not yet drained (stale ones included).
    in_flight: usize,
}

impl SearchDriver {
    pub fn new(widget: PeopleSearch, lookup: Arc<dyn DirectoryLookup>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            widget,
            lookup,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Record a keystroke.
    pub fn set_query(&mut self, text: &str) {
        self.widget.set_query(text);
    }

    /// Commit a selection.
    pub fn select(&mut self, record: DirectoryRecord) {
        self.widget.select(record);
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.widget.clear();
    }

    /// Advance the widget: apply any finished lookups, then dispatch a new
    /// one if the settled query calls for it.
    pub fn tick(&mut self) {
        self.drain_finished();
        if let Some(ticket) = self.widget.poll(Instant::now()) {
            self.dispatch(ticket);
        }
    }

    fn dispatch(&mut self, ticket: LookupTicket) {
        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = lookup.search_people(&ticket.query, MAX_CANDIDATES).await;
            // Send fails only if the driver is gone; nothing left to update.
            let _ = tx.send((ticket.generation, outcome));
        });
    }

    fn drain_finished(&mut self) {
        while let Ok((generation, outcome)) = self.rx.try_recv() {
            self.in_flight -= 1;
            self.widget.resolve(generation, outcome);
        }
    }

    /// Wait for one outstanding lookup to finish and apply it (plus any
    /// others already done). Returns `false` when nothing is in flight.
    pub async fn settle_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        // The driver holds a sender, so `recv` cannot yield `None` here.
        if let Some((generation, outcome)) = self.rx.recv().await {
            self.in_flight -= 1;
            self.widget.resolve(generation, outcome);
            self.drain_finished();
        }
        true
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn widget(&self) -> &PeopleSearch {
        &self.widget
    }
}
