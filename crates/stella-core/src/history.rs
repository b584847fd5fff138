//! Bounded internal back stack.
//!
//! [`HistoryStack`] records where the user came from so programmatic "back"
//! navigation does not depend on the host's native history. It holds at most
//! `limit` entries; pushing onto a full stack evicts the oldest entry (FIFO
//! eviction, entries are never revisited out of order).

use std::collections::VecDeque;

use crate::{Params, RouteId};

/// Number of entries retained by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// A prior navigation position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Route the user was on.
    pub route_id: RouteId,
    /// Parameters that route was entered with.
    pub params: Params,
    /// When the entry was recorded, in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl HistoryEntry {
    /// Create a history entry.
    pub fn new(route_id: RouteId, params: Params, timestamp_ms: u64) -> Self {
        Self { route_id, params, timestamp_ms }
    }
}

/// Bounded stack of prior navigation entries.
///
/// # Invariants
///
/// - `len() <= limit()` after every operation.
/// - Entries are ordered oldest first in [`HistoryStack::peek_all`].
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryStack {
    /// Create an empty stack holding at most `limit` entries.
    ///
    /// A limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self { entries: VecDeque::with_capacity(limit), limit }
    }

    /// Append an entry, evicting the oldest one when the stack is full.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Record the position being left on the way to `next`.
    ///
    /// Self-transitions are not recorded. Returns `true` if the entry was
    /// pushed.
    pub fn record(&mut self, previous: HistoryEntry, next: &RouteId) -> bool {
        if previous.route_id == *next {
            return false;
        }
        self.push(previous);
        true
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// Ordered copy of all entries, oldest first.
    pub fn peek_all(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Most recent entry without removing it.
    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the stack holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn entry(route: &str, ts: u64) -> HistoryEntry {
        HistoryEntry::new(RouteId::new(route), Params::new(), ts)
    }

    #[test]
    fn pop_returns_most_recent_first() {
        let mut stack = HistoryStack::new(3);
        stack.push(entry("a", 1));
        stack.push(entry("b", 2));

        assert_eq!(stack.pop().map(|e| e.route_id), Some(RouteId::new("b")));
        assert_eq!(stack.pop().map(|e| e.route_id), Some(RouteId::new("a")));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn full_stack_evicts_oldest() {
        // X -> Y -> Z -> W with room for two entries keeps Y and Z.
        let mut stack = HistoryStack::new(2);
        stack.push(entry("x", 1));
        stack.push(entry("y", 2));
        stack.push(entry("z", 3));

        let routes: Vec<_> = stack.peek_all().into_iter().map(|e| e.route_id).collect();
        assert_eq!(routes, vec![RouteId::new("y"), RouteId::new("z")]);
    }

    #[test]
    fn self_transition_is_not_recorded() {
        let mut stack = HistoryStack::new(4);
        assert!(!stack.record(entry("cart", 1), &RouteId::new("cart")));
        assert!(stack.is_empty());

        assert!(stack.record(entry("cart", 2), &RouteId::new("profile")));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        let mut stack = HistoryStack::new(0);
        stack.push(entry("a", 1));
        stack.push(entry("b", 2));
        assert_eq!(stack.limit(), 1);
        assert_eq!(stack.peek().map(|e| e.route_id.as_str()), Some("b"));
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_limit(limit in 1usize..16, pushes in 0usize..64) {
            let mut stack = HistoryStack::new(limit);
            for i in 0..pushes {
                stack.push(entry(&format!("r{i}"), i as u64));
                prop_assert!(stack.len() <= limit);
            }

            // The newest `limit` entries survive, oldest first.
            let expected: Vec<_> =
                (pushes.saturating_sub(limit)..pushes).map(|i| format!("r{i}")).collect();
            let actual: Vec<_> =
                stack.peek_all().into_iter().map(|e| e.route_id.as_str().to_string()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
