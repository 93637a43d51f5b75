//! Cache Partitions
//!
//! Named, versioned URL → response-snapshot stores. The worker keeps two
//! live partitions (shell and fonts); everything else is stale and gets
//! deleted on activation.
//!
//! Every operation is an atomic per-key put/get behind an async lock, so
//! concurrent fetch events need no coordination beyond last-write-wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::fetch::Response;

/// Cache storage error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The response body was consumed before the store; the caller must
    /// duplicate the response first.
    #[error("cannot store a response whose body was consumed")]
    ConsumedBody,
    /// Partial responses are never cached.
    #[error("cannot cache a partial response (206)")]
    PartialResponse,
}

/// A single named cache partition.
pub struct Cache {
    /// Partition name (e.g. `"taag-fonts-v1"`).
    name: String,
    /// URL → stored response.
    entries: RwLock<BTreeMap<String, Response>>,
}

impl Cache {
    /// Create an empty partition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Partition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a response keyed by URL. A later store for the same URL
    /// replaces the prior entry.
    pub async fn put(&self, url: &str, response: Response) -> Result<(), CacheError> {
        if response.body_used() {
            return Err(CacheError::ConsumedBody);
        }
        if response.status == 206 {
            return Err(CacheError::PartialResponse);
        }
        self.entries
            .write()
            .await
            .insert(String::from(url), response);
        Ok(())
    }

    /// Look up a response by exact URL. Returns a fresh snapshot whose body
    /// is unconsumed; the stored entry is untouched.
    pub async fn match_url(&self, url: &str) -> Option<Response> {
        self.entries
            .read()
            .await
            .get(url)
            .and_then(|r| r.clone_response().ok())
    }

    /// Delete an entry by URL.
    pub async fn delete(&self, url: &str) -> bool {
        self.entries.write().await.remove(url).is_some()
    }

    /// All cached URLs.
    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the partition holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// All cache partitions for the worker's origin.
pub struct CacheStorage {
    /// Partition name → partition.
    caches: RwLock<BTreeMap<String, Arc<Cache>>>,
}

impl CacheStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            caches: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open a partition, creating it if absent.
    pub async fn open(&self, name: &str) -> Arc<Cache> {
        let mut caches = self.caches.write().await;
        if let Some(cache) = caches.get(name) {
            return Arc::clone(cache);
        }
        let cache = Arc::new(Cache::new(name));
        caches.insert(String::from(name), Arc::clone(&cache));
        cache
    }

    /// Whether a partition exists.
    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.contains_key(name)
    }

    /// Delete a partition and everything in it.
    pub async fn delete(&self, name: &str) -> bool {
        self.caches.write().await.remove(name).is_some()
    }

    /// All partition names.
    pub async fn keys(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    /// Look up a URL in a specific partition.
    pub async fn match_in(&self, name: &str, url: &str) -> Option<Response> {
        let cache = self.caches.read().await.get(name).map(Arc::clone)?;
        cache.match_url(url).await
    }

    /// Look up a URL across all partitions, first hit in name order.
    pub async fn match_url(&self, url: &str) -> Option<Response> {
        let caches: Vec<Arc<Cache>> = self.caches.read().await.values().map(Arc::clone).collect();
        for cache in caches {
            if let Some(response) = cache.match_url(url).await {
                return Some(response);
            }
        }
        None
    }
}

impl Default for CacheStorage {
    fn default() -> Self {
        Self::new()
    }
}
