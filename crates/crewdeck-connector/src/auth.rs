//! Shared bearer-token cache for OAuth-style adapters.
//!
//! Token-issuing platforms hand out short-lived bearer tokens; each
//! adapter owns one [`TokenCache`] for the lifetime of the process and
//! refreshes proactively, a fixed margin before expiry. The cache is
//! shared mutable state without a lock around the fetch: a concurrent
//! miss may fetch twice, which is harmless because token issuance is
//! idempotent from the caller's perspective.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// How long before expiry a cached token is treated as stale.
const EARLY_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Process-lifetime cache for one adapter's bearer token.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Return the cached token if it is still comfortably inside its
    /// lifetime, `None` if absent or within the early-refresh margin.
    pub async fn get(&self) -> Option<String> {
        let guard = self.slot.read().await;
        match guard.as_ref() {
            Some(cached) if Instant::now() + EARLY_REFRESH < cached.expires_at => {
                Some(cached.token.clone())
            }
            _ => None,
        }
    }

    /// Store a freshly issued token with its advertised lifetime.
    pub async fn store(&self, token: impl Into<String>, expires_in: Duration) {
        let mut guard = self.slot.write().await;
        *guard = Some(CachedToken {
            token: token.into(),
            expires_at: Instant::now() + expires_in,
        });
    }

    /// Drop the cached token (e.g. after an upstream 401).
    pub async fn invalidate(&self) {
        let mut guard = self.slot.write().await;
        *guard = None;
    }
}
