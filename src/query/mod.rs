//! Query client: a cache policy wrapped around the database transport.
//!
//! ARCHITECTURE
//! ============
//! `QueryClient` is constructed once by the router factory and shared by
//! handle (`Clone` is an `Arc` bump). Pages read through it during a render;
//! several of them may ask for the same key concurrently, so a miss starts
//! exactly one transport call and every caller awaits the same shared future.
//!
//! TRADE-OFFS
//! ==========
//! Stale hits return immediately and refresh in a spawned task. A render
//! never waits on the network for data it already has, at the cost of
//! serving results up to one refresh round-trip old.

pub mod cache;
pub mod transport;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::telemetry::codes;
pub use cache::{CacheLookup, CachePolicy, QueryCache};
pub use transport::{ConvexHttpTransport, QueryTransport, TransportError};

// =============================================================================
// KEYS AND ERRORS
// =============================================================================

/// A database function reference plus its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryKey {
    pub function: String,
    pub args: Value,
}

impl QueryKey {
    #[must_use]
    pub fn new(function: impl Into<String>, args: Value) -> Self {
        Self { function: function.into(), args }
    }

    /// Canonical cache key. Object keys serialize in sorted order, so
    /// argument maps built in different orders hash identically.
    #[must_use]
    pub fn hash(&self) -> String {
        json!(["query", self.function, self.args]).to_string()
    }
}

/// Cloneable so one in-flight result can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}

type SharedFetch = Shared<BoxFuture<'static, Result<Value, QueryError>>>;

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn QueryTransport>,
    cache: Mutex<QueryCache>,
    in_flight: Mutex<HashMap<String, SharedFetch>>,
}

impl QueryClient {
    #[must_use]
    pub fn new(transport: Arc<dyn QueryTransport>, policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                cache: Mutex::new(QueryCache::new(policy)),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn policy(&self) -> CachePolicy {
        self.cache().policy()
    }

    /// Number of cached entries, including stale ones.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache().len()
    }

    /// Fetch through the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] only on a miss whose transport call fails.
    /// Stale hits never fail; a failed background refresh is logged.
    pub async fn fetch_query(&self, key: &QueryKey) -> Result<Value, QueryError> {
        let hash = key.hash();
        let lookup = self.cache().lookup_at(&hash, Instant::now());
        match lookup {
            CacheLookup::Fresh(value) => Ok(value),
            CacheLookup::Stale(value) => {
                self.spawn_refresh(key.clone(), hash);
                Ok(value)
            }
            CacheLookup::Miss => self.fetch_shared(key.clone(), hash).await,
        }
    }

    /// Mark a cached result stale so the next read refreshes it.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.cache().invalidate(&key.hash())
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.cache().remove(&key.hash())
    }

    /// Run a mutation. Failures are logged here and returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the transport call fails.
    pub async fn mutate(&self, function: &str, args: &Value) -> Result<Value, QueryError> {
        self.inner
            .transport
            .mutation(function, args)
            .await
            .map_err(|e| {
                tracing::error!(code = codes::QUERY_MUTATION_FAILED, function, error = %e, "mutation failed");
                QueryError::from(e)
            })
    }

    /// Evict entries idle past the retention window.
    pub fn collect_garbage(&self) -> usize {
        self.cache().evict_expired_at(Instant::now())
    }

    /// Spawn the periodic eviction sweep. Returns a handle for shutdown.
    #[must_use]
    pub fn spawn_gc_task(&self, every: Duration) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = client.collect_garbage();
                if evicted > 0 {
                    tracing::debug!(evicted, "query cache sweep");
                }
            }
        })
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.inner
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the in-flight call for `hash`, starting one if none exists.
    async fn fetch_shared(&self, key: QueryKey, hash: String) -> Result<Value, QueryError> {
        let fetch = {
            let mut in_flight = self.in_flight();
            if let Some(existing) = in_flight.get(&hash) {
                existing.clone()
            } else {
                let client = self.clone();
                let hash_for_task = hash.clone();
                let fetch = async move { client.run_fetch(key, hash_for_task).await }
                    .boxed()
                    .shared();
                in_flight.insert(hash, fetch.clone());
                fetch
            }
        };
        fetch.await
    }

    async fn run_fetch(&self, key: QueryKey, hash: String) -> Result<Value, QueryError> {
        let result = self
            .inner
            .transport
            .query(&key.function, &key.args)
            .await
            .map_err(QueryError::from);

        if let Ok(value) = &result {
            self.cache().insert_at(hash.clone(), value.clone(), Instant::now());
        }
        self.in_flight().remove(&hash);
        result
    }

    fn spawn_refresh(&self, key: QueryKey, hash: String) {
        if !self.cache().begin_refresh(&hash) {
            return;
        }

        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.fetch_shared(key.clone(), hash.clone()).await {
                tracing::warn!(code = codes::QUERY_REFRESH_FAILED, function = %key.function, error = %e, "background refresh failed; keeping stale value");
                client.cache().end_refresh(&hash);
            }
        });
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
