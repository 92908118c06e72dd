//! Per-key write coalescing.
//!
//! Rapid edits to the same key collapse into one pending write that fires
//! once the key has been quiet for the delay. Each key has its own timer, so
//! a burst on one key never delays or drops another.
//!
//! The debouncer does not own a clock or a thread. Callers pass `now` into
//! every method and ask for `next_deadline` to know when to come back. That
//! keeps the owner in control of where the write happens and lets tests step
//! time by hand.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A table of pending values keyed by `K`, each with its own deadline.
#[derive(Debug)]
pub struct Debouncer<K, V> {
    pending: HashMap<K, PendingWrite<V>>,
    delay: Duration,
}

#[derive(Debug, Clone)]
struct PendingWrite<V> {
    value: V,
    due: Instant,
}

impl<K, V> Debouncer<K, V>
where K: Eq + Hash + Clone
{
    /// Creates a debouncer with the default delay for `schedule`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            delay,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration { self.delay }

    /// Schedules `value` for `key`, replacing any pending value and
    /// restarting that key's timer.
    ///
    /// Returns `true` if a pending value was replaced.
    pub fn schedule(&mut self, key: K, value: V, now: Instant) -> bool {
        self.schedule_with_delay(key, value, self.delay, now)
    }

    /// Like `schedule`, with an explicit delay for this write.
    pub fn schedule_with_delay(&mut self, key: K, value: V, delay: Duration, now: Instant) -> bool {
        self.pending.insert(key, PendingWrite { value, due: now + delay }).is_some()
    }

    /// Removes and returns the pending value for `key`, whatever its deadline.
    pub fn flush(&mut self, key: &K) -> Option<V> { self.pending.remove(key).map(|p| p.value) }

    /// Removes and returns every value whose deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(k, _)| k.clone())
            .collect();

        due.into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|p| (key, p.value)))
            .collect()
    }

    /// Removes and returns every pending value.
    pub fn drain_all(&mut self) -> Vec<(K, V)> {
        self.pending.drain().map(|(k, p)| (k, p.value)).collect()
    }

    /// Drops the pending value for `key` without returning it.
    pub fn cancel(&mut self, key: &K) { self.pending.remove(key); }

    /// The earliest deadline among pending keys.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> { self.pending.values().map(|p| p.due).min() }

    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool { self.pending.contains_key(key) }

    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> { self.pending.get(key).map(|p| &p.value) }

    #[must_use]
    pub fn len(&self) -> usize { self.pending.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }
}
