//! Best-effort TTL cache for profile parameters.
//!
//! Sits in front of the profile store on the correction path. The contract
//! is strictly best-effort: a miss or an expired entry falls through to the
//! store, and nothing in here may ever fail a request.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config;
use crate::models::AdjustmentParameters;

struct CacheEntry {
    value: AdjustmentParameters,
    inserted_at: Instant,
}

/// In-memory keyed cache with per-instance TTL.
pub struct ParameterCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ParameterCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Cache with the TTL from configuration.
    pub fn from_config() -> Self {
        Self::new(Duration::from_secs(config::cache_ttl_secs()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock cannot corrupt a plain map read;
            // recover the guard rather than poisoning every later request.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Look up a key. Expired entries are evicted and read as a miss.
    pub fn get(&self, key: &str) -> Option<AdjustmentParameters> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "Cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: AdjustmentParameters) {
        self.lock().insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(brightness: f32) -> AdjustmentParameters {
        AdjustmentParameters {
            brightness,
            ..AdjustmentParameters::neutral()
        }
    }

    #[test]
    fn set_then_get_round_trips() {
        let cache = ParameterCache::new(Duration::from_secs(60));
        cache.set("profile:a", params(1.2));
        assert_eq!(cache.get("profile:a").unwrap().brightness, 1.2);
    }

    #[test]
    fn missing_key_is_a_miss() {
        let cache = ParameterCache::new(Duration::from_secs(60));
        assert!(cache.get("profile:unknown").is_none());
    }

    #[test]
    fn expired_entry_reads_as_miss_and_is_evicted() {
        let cache = ParameterCache::new(Duration::from_millis(0));
        cache.set("profile:a", params(1.2));
        assert!(cache.get("profile:a").is_none());
        // Evicted, not just hidden.
        assert!(cache.lock().get("profile:a").is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = ParameterCache::new(Duration::from_secs(60));
        cache.set("profile:a", params(1.2));
        cache.invalidate("profile:a");
        assert!(cache.get("profile:a").is_none());
    }

    #[test]
    fn overwrite_replaces_value() {
        let cache = ParameterCache::new(Duration::from_secs(60));
        cache.set("profile:a", params(1.1));
        cache.set("profile:a", params(1.3));
        assert_eq!(cache.get("profile:a").unwrap().brightness, 1.3);
    }
}
