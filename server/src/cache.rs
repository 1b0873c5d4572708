//! Time-bounded cache.
//!
//! A small key → (value, expiry) map with an injected clock, so expiry is
//! testable without sleeping. Each component owns its own instance; there
//! are no process-global caches.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Map whose entries expire a fixed TTL after insertion.
pub struct TtlCache<K, V, C = SystemClock> {
    entries: HashMap<K, (V, Instant)>,
    ttl: Duration,
    clock: C,
}

impl<K: Eq + Hash, V> TtlCache<K, V, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K: Eq + Hash, V, C: Clock> TtlCache<K, V, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Insert a value; its expiry is `ttl` from now.
    pub fn insert(&mut self, key: K, value: V) {
        let expires = self.clock.now() + self.ttl;
        self.entries.insert(key, (value, expires));
    }

    /// Get a live value; expired entries are removed on access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some((_, expires)) => *expires <= now,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(value, _)| value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(value, _)| value)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self) {
        let now = self.clock.now();
        self.entries.retain(|_, (_, expires)| *expires > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Clock advanced by hand in tests.
    #[derive(Clone)]
    struct ManualClock {
        start: Instant,
        offset_ms: Arc<AtomicU64>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset_ms: Arc::new(AtomicU64::new(0)),
            }
        }

        fn advance(&self, by: Duration) {
            self.offset_ms
                .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn values_live_until_the_ttl() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.insert("token", "ana@example.com");
        assert_eq!(cache.get(&"token"), Some(&"ana@example.com"));

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&"token"), Some(&"ana@example.com"));
    }

    #[test]
    fn values_expire_after_the_ttl() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.insert("token", "ana@example.com");
        clock.advance(Duration::from_secs(61));

        assert_eq!(cache.get(&"token"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_refreshes_expiry() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.insert("token", 1);
        clock.advance(Duration::from_secs(40));
        cache.insert("token", 2);
        clock.advance(Duration::from_secs(40));

        assert_eq!(cache.get(&"token"), Some(&2));
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let clock = ManualClock::new();
        let mut cache = TtlCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.insert("velho", 1);
        clock.advance(Duration::from_secs(45));
        cache.insert("novo", 2);
        clock.advance(Duration::from_secs(30));

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"novo"), Some(&2));
    }

    #[test]
    fn remove_returns_the_value() {
        let mut cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("token", 7);
        assert_eq!(cache.remove(&"token"), Some(7));
        assert_eq!(cache.get(&"token"), None);
    }
}
