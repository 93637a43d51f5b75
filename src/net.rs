//! Network Access
//!
//! The worker never talks to the network directly; it goes through the
//! [`NetworkFetcher`] trait so the host (or a test harness) decides how
//! requests actually leave the process. [`HttpFetcher`] is the production
//! implementation, backed by a blocking HTTP client run off the async
//! executor.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};
use ureq::Agent;

use crate::fetch::{Method, Request, Response};

/// Global timeout for all HTTP operations.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum response body size (10 MB). Font definition files are a few
/// hundred kilobytes at most.
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Network fetch error. A resolved HTTP response, whatever its status, is
/// not an error; only transport-level failures are.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// DNS, connection, TLS, timeout, or read failure.
    #[error("request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },
    /// The fetcher only issues safe idempotent requests.
    #[error("unsupported method {0} for network fetch")]
    UnsupportedMethod(&'static str),
}

/// Asynchronous network access used by the worker's strategies.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    /// Perform a network fetch for the request.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// HTTP-backed fetcher with native-tls and a global timeout.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher with the default agent configuration.
    pub fn new() -> Self {
        let tls_config = TlsConfig::builder()
            .provider(TlsProvider::NativeTls)
            .root_certs(RootCerts::PlatformVerifier)
            .build();

        let agent = Agent::config_builder()
            .tls_config(tls_config)
            .timeout_global(Some(HTTP_TIMEOUT))
            // Non-2xx statuses are responses, not errors; the caching
            // strategies decide what to do with them.
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        if request.method != Method::Get {
            return Err(NetworkError::UnsupportedMethod(request.method.as_str()));
        }

        let agent = self.agent.clone();
        let url = request.url.clone();
        let headers = request.headers.clone();

        let join = tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url, &headers));
        join.await.map_err(|e| NetworkError::Transport {
            url: request.url.clone(),
            reason: format!("fetch task failed: {}", e),
        })?
    }
}

/// Issue a blocking GET and snapshot the response.
fn fetch_blocking(
    agent: &Agent,
    url: &str,
    headers: &BTreeMap<String, String>,
) -> Result<Response, NetworkError> {
    let mut builder = agent.get(url);
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let http_response = builder.call().map_err(|e| NetworkError::Transport {
        url: String::from(url),
        reason: e.to_string(),
    })?;

    let (parts, mut body) = http_response.into_parts();
    let bytes = body
        .with_config()
        .limit(MAX_RESPONSE_SIZE)
        .read_to_vec()
        .map_err(|e| NetworkError::Transport {
            url: String::from(url),
            reason: e.to_string(),
        })?;

    let mut response = Response::new(parts.status.as_u16(), bytes);
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            response
                .headers
                .insert(String::from(name.as_str()), String::from(value));
        }
    }
    Ok(response)
}
