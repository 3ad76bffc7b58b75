// =============================================================================
// Response Cache — content-addressed, time-bounded memoisation
// =============================================================================
//
// Keys are SHA-256 fingerprints of the request fields that determine the
// response. Entries expire a fixed TTL after insertion; a stale entry is
// removed on the read that discovers it, and every `put` sweeps out whatever
// else has expired. Concurrent writers to the same key race and the last
// `put` wins.
//
// Thread safety: a single parking_lot::Mutex guards the map. Critical sections
// are a hash lookup or insert, so contention stays negligible.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time via `Instant::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hex SHA-256 of `parts`, each followed by a 0x1f separator so adjacent
/// fields cannot run together.
pub fn fingerprint<S: AsRef<str>>(parts: &[S]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref().as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Expiring key/value store shared across requests.
pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Cache backed by the system clock.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    /// Return a clone of the live value for `key`. An expired entry is purged
    /// and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                debug!(key, "cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
            debug!(key, "cache entry expired");
        }
        None
    }

    /// Store `value` under `key`, replacing any previous entry and restarting
    /// its TTL. Expired entries under other keys are dropped on the way.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| now < e.expires_at);
        let swept = before - entries.len();
        if swept > 0 {
            debug!(swept, "expired cache entries swept");
        }
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Number of stored entries, stale ones included until the next sweep.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Manual clock (tests)
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;

    fn cache_with_clock() -> (ResponseCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (ResponseCache::new(DEFAULT_TTL, clock.clone()), clock)
    }

    #[test]
    fn miss_then_hit() {
        let (cache, _clock) = cache_with_clock();
        assert!(cache.get("k").is_none());
        cache.put("k", "v".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn entry_expires_after_ttl_and_is_purged() {
        let (cache, clock) = cache_with_clock();
        cache.put("k", "v".to_string());

        clock.advance(DEFAULT_TTL - Duration::from_secs(1));
        assert!(cache.get("k").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_and_restarts_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put("k", "old".to_string());
        clock.advance(Duration::from_secs(200));
        cache.put("k", "new".to_string());
        clock.advance(Duration::from_secs(200));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn stale_entries_linger_until_read_or_put() {
        let (cache, clock) = cache_with_clock();
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        clock.advance(DEFAULT_TTL * 2);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_sweeps_expired_entries_under_other_keys() {
        let (cache, clock) = cache_with_clock();
        for i in 0..50 {
            cache.put(format!("batch-{i}"), i.to_string());
        }
        clock.advance(Duration::from_secs(100));
        cache.put("fresh", "x".to_string());
        assert_eq!(cache.len(), 51);

        clock.advance(DEFAULT_TTL - Duration::from_secs(50));
        cache.put("newest", "y".to_string());
        // The 50 batch entries are past their TTL; "fresh" is not.
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("fresh").as_deref(), Some("x"));
        assert_eq!(cache.get("newest").as_deref(), Some("y"));
    }

    #[test]
    fn concurrent_writers_leave_one_entry() {
        let cache = Arc::new(ResponseCache::<usize>::with_ttl(DEFAULT_TTL));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        cache.put("shared", i);
                        let _ = cache.get("shared");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
        assert!(cache.get("shared").unwrap() < 8);
    }

    #[test]
    fn fingerprint_is_stable_and_field_sensitive() {
        let a = fingerprint(&["live", "AAPL", "10"]);
        assert_eq!(a, fingerprint(&["live", "AAPL", "10"]));
        assert_eq!(a.len(), 64);
        assert_ne!(a, fingerprint(&["live", "AAPL1", "0"]));
    }
}
