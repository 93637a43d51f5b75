//! Offline Cache Manager
//!
//! The event-driven state machine between the page's requests and the
//! network. The host dispatches three lifecycle events — install, activate,
//! fetch — and each handler here returns a future the host awaits:
//!
//! - install pre-warms the shell partition (mandatory) and the curated
//!   fonts (best-effort), then signals eager takeover;
//! - activate garbage-collects every partition whose name is no longer
//!   current, then claims all clients;
//! - fetch classifies the request and applies cache-first (fonts) or
//!   network-first (everything else), always producing a well-formed
//!   response for GET requests it intercepts.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::CacheStorage;
use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::fetch::{Method, Request, Response};
use crate::net::NetworkFetcher;
use crate::tasks;

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Install event not yet completed.
    Installing,
    /// Installed and ready to take over from any previous worker.
    Waiting,
    /// Controlling pages and intercepting fetches.
    Active,
    /// Install failed; superseded.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

/// Result of intercepting a fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The worker produced a response (from cache, network, or synthetic).
    Response(Response),
    /// Not intercepted; the host proceeds with a plain network fetch.
    Passthrough,
}

impl FetchOutcome {
    /// The response, if the fetch was intercepted.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Response(response) => Some(response),
            Self::Passthrough => None,
        }
    }

    /// Whether the fetch was passed through untouched.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough)
    }
}

/// The offline cache manager.
pub struct OfflineWorker {
    config: WorkerConfig,
    caches: Arc<CacheStorage>,
    network: Arc<dyn NetworkFetcher>,
    state: RwLock<WorkerState>,
}

impl OfflineWorker {
    /// Create a worker in the `Installing` state with empty partitions.
    pub fn new(config: WorkerConfig, network: Arc<dyn NetworkFetcher>) -> Self {
        Self {
            config,
            caches: Arc::new(CacheStorage::new()),
            network,
            state: RwLock::new(WorkerState::Installing),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// The worker's configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// The worker's cache partitions.
    pub fn caches(&self) -> &Arc<CacheStorage> {
        &self.caches
    }

    /// Install event handler.
    ///
    /// Pre-caches the shell manifest and the curated fonts concurrently.
    /// The manifest is a hard dependency: any failure fails the install and
    /// the worker becomes redundant. Font pre-caching is best-effort. On
    /// success the worker moves straight to `Waiting` (eager takeover, no
    /// waiting on open clients).
    pub async fn on_install(&self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Installing)?;

        let (shell, fonts) = futures::join!(self.precache_shell(), self.precache_fonts());
        if let Err(err) = shell {
            *self.state.write() = WorkerState::Redundant;
            return Err(err);
        }
        log::debug!(
            "install complete: {} of {} curated fonts pre-cached",
            fonts,
            self.config.precache_fonts.len()
        );

        *self.state.write() = WorkerState::Waiting;
        Ok(())
    }

    /// Activate event handler.
    ///
    /// Deletes every partition whose name is neither the current shell nor
    /// the current font partition name, then claims all clients. A failed
    /// delete is logged and does not block activation.
    pub async fn on_activate(&self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Waiting)?;

        let live = [
            self.config.shell_cache_name.as_str(),
            self.config.font_cache_name.as_str(),
        ];
        for name in self.caches.keys().await {
            if live.contains(&name.as_str()) {
                continue;
            }
            if self.caches.delete(&name).await {
                log::debug!("deleted stale cache partition '{}'", name);
            } else {
                log::warn!("could not delete stale cache partition '{}'", name);
            }
        }

        *self.state.write() = WorkerState::Active;
        Ok(())
    }

    /// Fetch event handler.
    ///
    /// Non-GET requests pass through untouched. Font-CDN requests are
    /// served cache-first; all other GET requests network-first. An
    /// intercepted fetch always yields a response, never an error.
    pub async fn on_fetch(&self, request: Request) -> FetchOutcome {
        if request.method != Method::Get {
            return FetchOutcome::Passthrough;
        }
        if self.state() != WorkerState::Active {
            log::debug!("fetch for '{}' before activation, passing through", request.url);
            return FetchOutcome::Passthrough;
        }

        if self.config.is_font_request(&request.url) {
            FetchOutcome::Response(self.cache_first(&request).await)
        } else {
            FetchOutcome::Response(self.network_first(&request).await)
        }
    }

    /// Fetch and store every manifest URL; any failure is fatal.
    async fn precache_shell(&self) -> Result<(), WorkerError> {
        let cache = self.caches.open(&self.config.shell_cache_name).await;
        let stores = self.config.asset_manifest.iter().map(|url| {
            let cache = Arc::clone(&cache);
            async move {
                let response = self
                    .network
                    .fetch(&Request::new(url.clone()))
                    .await
                    .map_err(|e| WorkerError::PrecacheFailed {
                        url: url.clone(),
                        reason: e.to_string(),
                    })?;
                if !response.ok() {
                    return Err(WorkerError::PrecacheFailed {
                        url: url.clone(),
                        reason: format!("status {}", response.status),
                    });
                }
                cache
                    .put(url, response)
                    .await
                    .map_err(|e| WorkerError::PrecacheFailed {
                        url: url.clone(),
                        reason: e.to_string(),
                    })
            }
        });
        tasks::require_all(stores).await.map(|_| ())
    }

    /// Fetch and store each curated font; failures are skipped. Returns the
    /// number of fonts stored.
    async fn precache_fonts(&self) -> usize {
        let cache = self.caches.open(&self.config.font_cache_name).await;
        let stores = self.config.precache_fonts.iter().map(|name| {
            let cache = Arc::clone(&cache);
            let url = self.config.font_url(name);
            async move {
                let response = self
                    .network
                    .fetch(&Request::new(url.clone()))
                    .await
                    .map_err(|e| format!("font '{}': {}", name, e))?;
                if !response.ok() {
                    return Err(format!("font '{}': status {}", name, response.status));
                }
                cache
                    .put(&url, response)
                    .await
                    .map_err(|e| format!("font '{}': {}", name, e))
            }
        });
        tasks::settle_all(stores).await.len()
    }

    /// Cache-first strategy for font-CDN requests. Fonts are immutable, so
    /// a hit is served without a freshness check or network round-trip.
    async fn cache_first(&self, request: &Request) -> Response {
        let cache = self.caches.open(&self.config.font_cache_name).await;
        if let Some(hit) = cache.match_url(&request.url).await {
            log::debug!("font cache hit for '{}'", request.url);
            return hit;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                match response.clone_response() {
                    Ok(copy) => {
                        if let Err(err) = cache.put(&request.url, copy).await {
                            log::warn!("could not cache font '{}': {}", request.url, err);
                        }
                    }
                    Err(err) => {
                        log::warn!("font response for '{}' not cacheable: {}", request.url, err)
                    }
                }
                response
            }
            Err(err) => {
                log::warn!("font fetch for '{}' failed offline: {}", request.url, err);
                Response::font_unavailable()
            }
        }
    }

    /// Network-first strategy for everything else. A network success
    /// opportunistically refreshes the shell partition; a network failure
    /// falls back to cache, then to the offline document for HTML requests,
    /// then to a synthetic 408.
    async fn network_first(&self, request: &Request) -> Response {
        match self.network.fetch(request).await {
            Ok(response) => {
                match response.clone_response() {
                    Ok(copy) => {
                        let cache = self.caches.open(&self.config.shell_cache_name).await;
                        if let Err(err) = cache.put(&request.url, copy).await {
                            log::warn!("could not update shell cache for '{}': {}", request.url, err);
                        }
                    }
                    Err(err) => {
                        log::warn!("response for '{}' not cacheable: {}", request.url, err)
                    }
                }
                response
            }
            Err(err) => {
                log::debug!("network fetch for '{}' failed, trying cache: {}", request.url, err);
                self.serve_offline(request).await
            }
        }
    }

    /// Offline fallback chain: exact URL in the shell partition, exact URL
    /// anywhere, cached root document for HTML requests, synthetic 408.
    async fn serve_offline(&self, request: &Request) -> Response {
        if let Some(hit) = self
            .caches
            .match_in(&self.config.shell_cache_name, &request.url)
            .await
        {
            return hit;
        }
        if let Some(hit) = self.caches.match_url(&request.url).await {
            return hit;
        }
        if request.accepts_html() {
            if let Some(root) = self
                .caches
                .match_in(&self.config.shell_cache_name, &self.config.offline_fallback)
                .await
            {
                log::debug!("serving offline fallback document for '{}'", request.url);
                return root;
            }
        }
        Response::network_error()
    }

    fn expect_state(&self, expected: WorkerState) -> Result<(), WorkerError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState { state })
        }
    }
}
