//! Small in-memory cache whose entries expire after a fixed TTL.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thread-safe key/value cache with per-entry expiry.
///
/// Expired entries are invisible to readers and are dropped lazily on access
/// or eagerly via [`TtlCache::purge_expired`].
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

/// Counts attempts per key (message id, session) inside the TTL window.
pub type RetryCounterCache = TtlCache<String, u32>;

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let found = entries
            .get(key)
            .map(|(value, inserted)| (value.clone(), inserted.elapsed() < self.ttl));
        match found {
            Some((value, true)) => Some(value),
            Some((_, false)) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace a value, restarting its TTL.
    pub fn set(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, (value, Instant::now()));
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key).map(|(v, _)| v)
    }

    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, (_, inserted)| inserted.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .values()
            .filter(|(_, inserted)| inserted.elapsed() < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl<K: Eq + Hash + Clone> TtlCache<K, u32> {
    /// Increment the counter for `key` and return the new value.
    ///
    /// An expired or missing counter starts again at 1.
    pub fn increment(&self, key: K) -> u32 {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let count = match entries.get(&key) {
            Some((n, inserted)) if inserted.elapsed() < self.ttl => n + 1,
            _ => 1,
        };
        entries.insert(key, (count, now));
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_live_value() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("a".into(), 7);
        assert_eq!(cache.get(&"a".to_string()), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(20));
        cache.set("a".into(), 1);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"a".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_increment_counts_and_restarts_after_expiry() {
        let cache = RetryCounterCache::new(Duration::from_millis(30));
        assert_eq!(cache.increment("msg".into()), 1);
        assert_eq!(cache.increment("msg".into()), 2);
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.increment("msg".into()), 1);
    }

    #[test]
    fn test_purge_expired_removes_only_stale() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_millis(30));
        cache.set("old", 1);
        std::thread::sleep(Duration::from_millis(60));
        cache.set("new", 2);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get(&"new"), Some(2));
    }
}
