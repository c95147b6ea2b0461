//! Expiring schema cache keyed by canonical path.
//!
//! Expiry is lazy: an entry whose age has reached the TTL is evicted by the
//! read that observes it. Without a TTL entries never expire. Only
//! successful lookups are stored.
//!
//! The map sits behind a `parking_lot::Mutex`. Callers never hold the lock
//! across an `.await`; every method takes and releases it internally.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

/// A cached schema document and the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub schema: Value,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
    capacity: Option<NonZeroUsize>,
}

impl SchemaCache {
    /// Unbounded cache with an optional time-to-live.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: None,
        }
    }

    /// Bound the number of entries. `0` leaves the cache unbounded.
    ///
    /// When a bounded cache is full, storing a new path evicts the entry
    /// with the oldest `stored_at`.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = NonZeroUsize::new(capacity);
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        // A TTL beyond chrono's range never elapses.
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return false;
        };
        now.signed_duration_since(entry.stored_at) >= ttl
    }

    /// Return the live entry for `path` as of `now`, evicting it if expired.
    pub fn get(&self, path: &str, now: DateTime<Utc>) -> Option<Value> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(path) {
            None => return None,
            Some(entry) => self.is_expired(entry, now),
        };
        if expired {
            entries.remove(path);
            tracing::debug!(path, "evicted expired schema");
            return None;
        }
        entries.get(path).map(|entry| entry.schema.clone())
    }

    /// Store `schema` at `path`, replacing any previous entry.
    pub fn insert(&self, path: impl Into<String>, schema: Value, now: DateTime<Utc>) {
        let path = path.into();
        let mut entries = self.entries.lock();
        if let Some(capacity) = self.capacity {
            if !entries.contains_key(&path) && entries.len() >= capacity.get() {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(p, _)| p.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                    tracing::debug!(path = %oldest, "evicted oldest schema at capacity");
                }
            }
        }
        entries.insert(
            path,
            CacheEntry {
                schema,
                stored_at: now,
            },
        );
    }

    /// The raw entry for `path`, expired or not.
    pub fn entry(&self, path: &str) -> Option<CacheEntry> {
        self.entries.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
