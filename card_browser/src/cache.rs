//! In-memory response cache with a freshness window
//!
//! Entries live for the life of the process and are dropped on `clear`, when
//! a lookup finds them stale, or when an insert sweeps expired entries. The
//! store is capped; at the cap the oldest entry makes room for the new one.
//! The map sits behind a plain `Mutex`; the lock is only held for the map
//! operation itself, never across an await.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default cap on entries per store
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// A cached value plus the moment it was stored
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Snapshot of a cache's size and counters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl_seconds: u64,
    pub max_entries: usize,
    /// RFC 3339 timestamp of the last `clear`, if any
    pub last_cleared: Option<String>,
}

/// Key/value cache whose entries are valid for `ttl` after insertion
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    last_cleared: Mutex<Option<chrono::DateTime<chrono::Utc>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_max_entries(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Cache holding at most `max_entries` (at least one)
    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            last_cleared: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // A panic while holding the lock can't leave the map half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a fresh value. Stale entries are evicted and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();

        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(self.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value with a fresh timestamp, replacing any previous entry.
    /// Adding a new key first sweeps expired entries, then evicts the oldest
    /// entry if the store is still full.
    pub fn insert(&self, key: K, value: V)
    where
        K: Clone,
    {
        let mut entries = self.lock();

        if !entries.contains_key(&key) {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(self.ttl));
            if entries.len() < before {
                log::debug!("Swept {} expired cache entries", before - entries.len());
            }

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry. Hit/miss counters are kept.
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.lock();
            let removed = entries.len();
            entries.clear();
            removed
        };
        *self
            .last_cleared
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(chrono::Utc::now());
        log::debug!("Cleared {} cache entries", removed);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Read-only snapshot. Stale entries still count until a lookup evicts them.
    pub fn stats(&self) -> CacheStats {
        let last_cleared = *self
            .last_cleared
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_seconds: self.ttl.as_secs(),
            max_entries: self.max_entries,
            last_cleared: last_cleared.map(|at| at.to_rfc3339()),
        }
    }
}
