//! Settled-value primitive.
//!
//! A `Debouncer` turns a rapidly-changing input into a value that only
//! updates after a quiet period: the settled value is the most recent input
//! that has remained unchanged for at least the configured delay.
//!
//! The clock is injected: callers pass `Instant` on every [`Debouncer::observe`]
//! and the primitive does no timer scheduling of its own. The pending publish
//! is plain owned state, so a widget that drops its debouncer before the
//! quiet period elapses drops the pending value with it: no dangling timer,
//! no late mutation of freed state.

use std::time::{Duration, Instant};

/// Default quiet period when the caller does not specify one.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Debounces a caller-supplied, possibly-changing value.
///
/// One instance owns one settled value. On construction the settled value
/// equals the initial input immediately, with no artificial initial delay.
#[derive(Debug, Clone)]
pub struct Debouncer<V> {
    settled: V,
    last_seen: V,
    deadline: Option<Instant>,
    delay: Duration,
}

impl<V: Clone + PartialEq> Debouncer<V> {
    /// Create with the default 400 ms quiet period.
    pub fn new(initial: V) -> Self {
        Self::with_delay(initial, DEFAULT_DEBOUNCE)
    }

    /// Create with an explicit quiet period.
    pub fn with_delay(initial: V, delay: Duration) -> Self {
        Self {
            settled: initial.clone(),
            last_seen: initial,
            deadline: None,
            delay,
        }
    }

    /// Re-evaluate against the current input value.
    ///
    /// A change to `current` cancels any pending publish and arms a new
    /// deadline `delay` after `now`, even when `current` equals the
    /// already-settled value (no look-back deduplication; the timer restarts
    /// from the latest change). When the input has been stable past an armed
    /// deadline, the pending value is published exactly once.
    pub fn observe(&mut self, current: V, now: Instant) -> &V {
        if current != self.last_seen {
            self.last_seen = current;
            self.deadline = Some(now + self.delay);
        } else if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.settled = self.last_seen.clone();
                self.deadline = None;
            }
        }
        &self.settled
    }

    /// The most recent value that survived a full quiet period.
    pub fn settled(&self) -> &V {
        &self.settled
    }

    /// Whether a publish is armed and waiting for the quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Settle `value` immediately, cancelling any pending publish.
    ///
    /// Used when the owner replaces the input wholesale (committing or
    /// clearing a selection) and must not see a stale publish afterwards.
    pub fn reset(&mut self, value: V) {
        self.settled = value.clone();
        self.last_seen = value;
        self.deadline = None;
    }
}
