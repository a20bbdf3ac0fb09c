//! Process-local result cache with per-entry expiry
//!
//! Entries are opaque JSON payloads keyed by strings the caller builds from an
//! operation name and its normalized parameters. An entry older than its TTL is
//! never returned: [`ResultCache::get`] evicts it on access, and an optional
//! background sweep started with [`ResultCache::start_sweeper`] removes the rest.
//!
//! There is no capacity bound. The number of entries is bounded by the number of
//! distinct query shapes, not by catalog size.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    payload: Value,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Snapshot returned by [`ResultCache::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    /// Serialized size of keys and payloads, in bytes
    pub approx_bytes: usize,
}

pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResultCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `payload` under `key`, replacing any previous entry.
    /// `ttl` of `None` uses the cache's default TTL.
    pub fn set(&self, key: impl Into<String>, payload: Value, ttl: Option<Duration>) {
        let entry = CacheEntry {
            payload,
            created_at: Instant::now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.lock().insert(key.into(), entry);
    }

    /// Returns the payload for `key` if present and not expired.
    /// An expired entry is removed before returning `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                debug!("Cache entry expired: {}", key);
                None
            }
            Some(entry) => {
                debug!("Cache hit: {}", key);
                Some(entry.payload.clone())
            }
            None => {
                debug!("Cache miss: {}", key);
                None
            }
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Evicts every expired entry and returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let approx_bytes = entries
            .iter()
            .map(|(key, entry)| key.len() + entry.payload.to_string().len())
            .sum();

        CacheStats {
            entries: entries.len(),
            approx_bytes,
        }
    }

    /// Spawns the periodic sweep on the current Tokio runtime.
    ///
    /// The sweep runs until [`SweepHandle::stop`] is called or the handle is dropped.
    pub fn start_sweeper(self: &Arc<Self>, every: Duration) -> SweepHandle {
        let cache = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let evicted = cache.purge_expired();
                if evicted > 0 {
                    debug!("Cache sweep evicted {} expired entries", evicted);
                }
            }
        });

        SweepHandle { task: Some(task) }
    }
}

/// Owns the background sweep task of a [`ResultCache`]
pub struct SweepHandle {
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    pub fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
