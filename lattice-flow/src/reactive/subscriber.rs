//! Subscriber identifiers for the reactive system.
//!
//! A subscriber is any computation that depends on reactive values. In this
//! crate every mounted render scope is a subscriber, so the same identifier
//! doubles as the scope identifier in the host renderer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of something that reads observables and wants to hear about
/// their changes.
///
/// Ids are allocated in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Allocate the next id. Safe to call from any thread.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric value, for logging.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn ids_are_never_reused() {
        let ids: HashSet<_> = (0..64).map(|_| SubscriberId::new()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn subscriber_ids_increase() {
        let first = SubscriberId::new();
        let second = SubscriberId::new();
        assert!(second > first);
        assert_eq!(format!("{}", first), format!("#{}", first.raw()));
    }
}
