//! In-memory access-token cache.
//!
//! Tokens are keyed by credential set and expire after a fixed lifetime that
//! never exceeds the token's own `expires_in`. Expired entries are treated as
//! absent and overwritten on the next insert.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Clone, Default)]
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<String, CachedToken>>>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache").finish_non_exhaustive()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.token.clone())
    }

    pub async fn insert(&self, key: &str, token: String, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), CachedToken { token, expires_at });
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// How long a freshly minted token may be reused.
pub fn effective_ttl(configured: Duration, expires_in: Option<u64>) -> Duration {
    match expires_in {
        Some(secs) => configured.min(Duration::from_secs(secs)),
        None => configured,
    }
}
