use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

/// Default freshness window for assembled reports.
pub fn default_ttl() -> Duration {
    Duration::minutes(10)
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: DateTime<Utc>,
}

/// Keyed, TTL-bounded memoization of assembled reports.
///
/// Values are cloned out under a short-lived lock, so concurrent readers
/// and writers from in-flight report requests never observe a torn entry.
/// Expiry is judged against the injected clock.
pub struct ReportCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ReportCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Return the cached value for `key` if it is still fresh. An entry
    /// that has aged past the TTL is dropped on observation.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());

        match entries.get(key) {
            Some(entry) if now - entry.created_at < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store or overwrite `key`, stamped with the current time.
    pub fn put(&self, key: &str, value: T) {
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), entry);
    }

    /// Drop every entry whose key starts with `prefix`. For callers that
    /// know the underlying data changed before the TTL ran out.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
