//! Keyed store with an explicit expiry timestamp per entry

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Entries are never considered fresh implicitly: every lookup is checked
/// against the caller-supplied `now`.
#[derive(Debug, Clone)]
pub struct ExpiringStore<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V> ExpiringStore<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert with a time-to-live counted from `now`
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>, ttl: Duration) {
        self.insert_until(key, value, now + ttl);
    }

    pub fn insert_until(&mut self, key: K, value: V, expires_at: DateTime<Utc>) {
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// The live value for `key`, or `None` when absent or expired at `now`
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| &entry.value)
    }

    pub fn expires_at(&self, key: &K) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.expires_at)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every entry expired at `now`, returning how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> Default for ExpiringStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
