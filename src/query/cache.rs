//! Query result cache with staleness and retention windows.
//!
//! DESIGN
//! ======
//! Entries carry two clocks. `updated_at` drives staleness: once a result is
//! older than `stale_time` it is still served, but the caller should refresh
//! it in the background. `last_accessed` drives retention: an entry nobody
//! has read or written for `gc_time` is evicted. Every method takes `now`
//! explicitly so tests can move time without sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which a result is eligible for background refresh.
    pub stale_time: Duration,
    /// Idle time after which an entry is evicted.
    pub gc_time: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { stale_time: DEFAULT_STALE_TIME, gc_time: DEFAULT_GC_TIME }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Fresh(Value),
    Stale(Value),
    Miss,
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    updated_at: Instant,
    last_accessed: Instant,
    invalidated: bool,
    refreshing: bool,
}

#[derive(Debug)]
pub struct QueryCache {
    policy: CachePolicy,
    entries: HashMap<String, CacheEntry>,
}

impl QueryCache {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self { policy, entries: HashMap::new() }
    }

    #[must_use]
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read an entry and mark it touched. Entries idle past the retention
    /// window count as a miss even if the sweeper has not run yet.
    pub fn lookup_at(&mut self, hash: &str, now: Instant) -> CacheLookup {
        let Some(entry) = self.entries.get_mut(hash) else {
            return CacheLookup::Miss;
        };

        if now.saturating_duration_since(entry.last_accessed) >= self.policy.gc_time {
            self.entries.remove(hash);
            return CacheLookup::Miss;
        }

        entry.last_accessed = now;
        let stale = entry.invalidated || now.saturating_duration_since(entry.updated_at) > self.policy.stale_time;
        if stale {
            CacheLookup::Stale(entry.value.clone())
        } else {
            CacheLookup::Fresh(entry.value.clone())
        }
    }

    /// Store a fresh result, clearing any invalidation or refresh marker.
    pub fn insert_at(&mut self, hash: String, value: Value, now: Instant) {
        self.entries.insert(
            hash,
            CacheEntry { value, updated_at: now, last_accessed: now, invalidated: false, refreshing: false },
        );
    }

    /// Claim the background refresh for an entry.
    ///
    /// Returns `false` if the entry is gone or a refresh is already running.
    pub fn begin_refresh(&mut self, hash: &str) -> bool {
        match self.entries.get_mut(hash) {
            Some(entry) if !entry.refreshing => {
                entry.refreshing = true;
                true
            }
            _ => false,
        }
    }

    /// Release a refresh claim without replacing the value (refresh failed).
    pub fn end_refresh(&mut self, hash: &str) {
        if let Some(entry) = self.entries.get_mut(hash) {
            entry.refreshing = false;
        }
    }

    /// Force the next lookup to report the entry as stale.
    pub fn invalidate(&mut self, hash: &str) -> bool {
        match self.entries.get_mut(hash) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, hash: &str) -> bool {
        self.entries.remove(hash).is_some()
    }

    /// Drop every entry idle for at least the retention window.
    pub fn evict_expired_at(&mut self, now: Instant) -> usize {
        let gc_time = self.policy.gc_time;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_accessed) < gc_time);
        before - self.entries.len()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
