//! TTL cache for weather lookups
//!
//! Provides a `CacheStore` that keeps serialized `WeatherResult`s in a
//! key-value substrate with a write timestamp. Expiry is lazy: a stale or
//! unreadable entry is deleted the moment a read sees it, and
//! `sweep_expired` does the same for every entry at once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::store::KeyValueStore;
use crate::config::CacheConfig;
use crate::data::WeatherResult;

/// Serialized form of a cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached response
    data: T,
    /// When the entry was written, in Unix milliseconds
    timestamp: i64,
}

/// Cache of weather results keyed by normalized location query
///
/// Every operation is best-effort: substrate failures are logged and turn
/// into misses (reads) or no-ops (writes), never errors.
#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
    /// TTL in milliseconds
    ttl_ms: i64,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("namespace", &self.namespace)
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Creates a cache over `store` using the system clock
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            namespace: config.namespace,
            ttl_ms: i64::try_from(config.ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Replaces the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Derives the storage key for a location query
    ///
    /// Queries that differ only in case or surrounding whitespace share a key.
    pub fn key_for(&self, query: &str) -> String {
        format!("{}{}", self.namespace, normalize_query(query))
    }

    /// Returns the cached result for `query` if it is still fresh
    ///
    /// A stale entry, or one that cannot be decoded, is removed and treated
    /// as a miss.
    pub fn get(&self, query: &str) -> Option<WeatherResult> {
        let key = self.key_for(query);

        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<WeatherResult> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(%key, error = %e, "discarding unreadable cache entry");
                self.remove(&key);
                return None;
            }
        };

        let age_ms = self.age_ms(entry.timestamp);
        if age_ms > self.ttl_ms {
            tracing::debug!(%key, age_secs = age_ms / 1000, "cache entry expired");
            self.remove(&key);
            return None;
        }

        tracing::debug!(
            %key,
            remaining_secs = (self.ttl_ms - age_ms) / 1000,
            "serving cached weather"
        );
        Some(entry.data)
    }

    /// Stores `payload` for `query`, stamped with the current time
    ///
    /// Failures are logged and dropped; a result that could not be cached is
    /// simply fetched again next time.
    pub fn put(&self, query: &str, payload: &WeatherResult) {
        let key = self.key_for(query);
        let entry = CacheEntry {
            data: payload,
            timestamp: self.clock.now().timestamp_millis(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(%key, error = %e, "could not encode cache entry");
                return;
            }
        };

        match self.store.set(&key, &json) {
            Ok(()) => tracing::debug!(%key, "cached weather"),
            Err(e) => tracing::warn!(%key, error = %e, "cache write failed"),
        }
    }

    /// Removes every stale or unreadable entry in this namespace
    ///
    /// Returns how many entries were removed. Entries outside the namespace
    /// are never touched.
    pub fn sweep_expired(&self) -> usize {
        let mut removed = 0;

        for key in self.namespaced_keys() {
            let raw = match self.store.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(%key, error = %e, "cache read failed during sweep");
                    continue;
                }
            };

            let stale = match serde_json::from_str::<CacheEntry<WeatherResult>>(&raw) {
                Ok(entry) => self.age_ms(entry.timestamp) > self.ttl_ms,
                Err(_) => true,
            };

            if stale && self.remove(&key) {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "swept expired cache entries");
        }
        removed
    }

    /// Removes every entry in this namespace, fresh or not
    pub fn clear(&self) -> usize {
        let removed = self
            .namespaced_keys()
            .into_iter()
            .filter(|key| self.remove(key))
            .count();

        if removed > 0 {
            tracing::info!(removed, "cleared cache");
        }
        removed
    }

    fn namespaced_keys(&self) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(&self.namespace))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not list cache entries");
                Vec::new()
            }
        }
    }

    fn age_ms(&self, timestamp: i64) -> i64 {
        self.clock.now().timestamp_millis().saturating_sub(timestamp)
    }

    fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%key, error = %e, "cache delete failed");
                false
            }
        }
    }
}

/// Trims and lower-cases a location query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
