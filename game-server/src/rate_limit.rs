use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

/// Per-identity request throttle. Injected into the routes so deployments
/// can swap the in-process default for a shared store.
pub trait RateLimiter: Send + Sync {
    /// Returns true if the request may proceed, recording it as this key's
    /// latest request. A denied request does not reset the interval.
    fn check_and_record(&self, key: &str) -> bool;
}

/// Default in-process limiter: at most one request per key per interval.
pub struct PerKeyRateLimiter {
    last_request: DashMap<String, Instant>,
    min_interval: Duration,
}

impl PerKeyRateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: DashMap::new(),
            min_interval,
        }
    }

    /// Drops keys idle long enough that they can no longer be limited.
    pub fn purge_stale(&self) {
        let now = Instant::now();
        let min_interval = self.min_interval;
        self.last_request
            .retain(|_, last| now.duration_since(*last) < min_interval);
    }

    pub fn tracked_keys(&self) -> usize {
        self.last_request.len()
    }
}

impl RateLimiter for PerKeyRateLimiter {
    fn check_and_record(&self, key: &str) -> bool {
        let now = Instant::now();
        match self.last_request.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) < self.min_interval {
                    false
                } else {
                    entry.insert(now);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }
}
