use std::collections::VecDeque;

use tracing::debug;

use crate::config::MAX_QUEUED_DIRECTIONS;
use crate::input::{direction_change_is_valid, Direction};

/// Direction changes buffered between ticks.
///
/// Input arrives at any rate while the simulation advances at a fixed one,
/// so each request is held here until a tick consumes it. Every request is
/// checked against the *effective* direction (the newest queued entry, or the
/// snake's live heading when nothing is queued) so a burst of keys can never
/// produce a 180° turn within a single tick.
#[derive(Debug, Clone, Default)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the direction the next tick would apply.
    #[must_use]
    pub fn effective(&self, live: Direction) -> Direction {
        self.pending.back().copied().unwrap_or(live)
    }

    /// Buffers `requested` unless it reverses or repeats the effective
    /// direction. Returns whether the request was kept.
    pub fn enqueue(&mut self, requested: Direction, live: Direction) -> bool {
        let effective = self.effective(live);

        if requested == effective || !direction_change_is_valid(effective, requested) {
            debug!(%requested, %effective, "direction request dropped");
            return false;
        }

        if self.pending.len() >= MAX_QUEUED_DIRECTIONS {
            debug!(%requested, "direction queue full");
            return false;
        }

        self.pending.push_back(requested);
        true
    }

    /// Removes queued entries oldest first and returns the first one that is
    /// still a legal turn from `live`, or `None` when nothing applies.
    pub fn dequeue_next(&mut self, live: Direction) -> Option<Direction> {
        while let Some(next) = self.pending.pop_front() {
            if direction_change_is_valid(live, next) {
                return Some(next);
            }
            debug!(%next, %live, "stale direction skipped at dequeue");
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
