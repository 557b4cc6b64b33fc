//! Cancel-and-replace timers over an explicit clock
//!
//! Nothing fires on its own: the owner polls with the current instant and
//! runs whatever came due. Scheduling a key that is already pending
//! replaces its deadline, so only the last call per key survives.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    pending: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Default for Debouncer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Arms `key` for `deadline`. Returns true when a pending timer for
    /// the same key was replaced.
    pub fn schedule(&mut self, key: K, deadline: Instant) -> bool {
        self.pending.insert(key, deadline).is_some()
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Drops every pending timer; returns how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.pending.get(key).copied()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns the keys due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (key.clone(), *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);
        for (key, _) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_last_schedule_wins() {
        let start = Instant::now();
        let mut timers = Debouncer::new();
        assert!(!timers.schedule("submit", start + Duration::from_millis(100)));
        assert!(timers.schedule("submit", start + Duration::from_millis(300)));
        assert_eq!(timers.len(), 1);

        assert!(timers.take_due(start + Duration::from_millis(200)).is_empty());
        assert_eq!(timers.take_due(start + Duration::from_millis(300)), vec!["submit"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let start = Instant::now();
        let mut timers = Debouncer::new();
        timers.schedule("b", start + Duration::from_millis(20));
        timers.schedule("a", start + Duration::from_millis(10));
        timers.schedule("c", start + Duration::from_millis(500));
        assert_eq!(timers.next_deadline(), Some(start + Duration::from_millis(10)));
        assert_eq!(timers.take_due(start + Duration::from_millis(50)), vec!["a", "b"]);
        assert!(timers.is_pending(&"c"));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timers = Debouncer::new();
        timers.schedule(1, start);
        timers.schedule(2, start);
        assert!(timers.cancel(&1));
        assert!(!timers.cancel(&1));
        assert_eq!(timers.cancel_all(), 1);
        assert!(timers.take_due(start).is_empty());
    }
}
