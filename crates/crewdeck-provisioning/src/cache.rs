//! Time-bounded memoization of expensive list operations.
//!
//! A single-entry cache: `get_or_fetch` serves the snapshot while it is
//! younger than the TTL, otherwise runs the fetch and replaces the
//! entry unconditionally. There is no negative caching and no stampede
//! protection: concurrent misses may fetch twice, which is acceptable
//! because the wrapped calls are idempotent, read-only listings.
//! `invalidate` must be called after any mutating operation on the same
//! resource class so stale snapshots are not served.

use std::future::Future;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crewdeck_connector::types::PhoneNumber;

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct Entry<T> {
    fetched_at: Instant,
    value: T,
}

/// Single-entry, TTL-bound cache.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: RwLock<Option<Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// The fresh snapshot, if one exists.
    pub async fn get(&self) -> Option<T> {
        let guard = self.slot.read().await;
        match guard.as_ref() {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Serve the cached snapshot or run `fetch` and cache its result.
    ///
    /// The lock is not held across the fetch, so concurrent misses may
    /// both fetch; the later store wins.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get().await {
            tracing::debug!("serving cached snapshot");
            return Ok(value);
        }

        let value = fetch().await?;
        self.store(value.clone()).await;
        Ok(value)
    }

    /// Replace the snapshot unconditionally.
    pub async fn store(&self, value: T) {
        let mut guard = self.slot.write().await;
        *guard = Some(Entry {
            fetched_at: Instant::now(),
            value,
        });
    }

    /// Drop the snapshot. Called after mutations of the cached resource.
    pub async fn invalidate(&self) {
        let mut guard = self.slot.write().await;
        *guard = None;
    }
}

/// The shared snapshot of the telephony platform's owned-number inventory.
pub type NumberCache = TtlCache<Vec<PhoneNumber>>;
