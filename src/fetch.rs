//! Fetch Types
//!
//! Request and response snapshots exchanged between the page, the offline
//! worker, and the cache partitions.
//!
//! Response bodies are single-consumption: once a body is taken, the
//! response can neither be read again nor stored. A response that will be
//! both returned to a caller and persisted must be duplicated first via
//! [`Response::clone_response`], which refuses to clone a consumed body.

use std::collections::BTreeMap;

use thiserror::Error;

/// Error raised when a single-consumption body is used twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("response body already consumed")]
pub struct BodyConsumed;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Convert to the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// An outgoing request intercepted by the worker.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request URL (exact-match cache key).
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers (name → value).
    pub headers: BTreeMap<String, String>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a GET request for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `Accept` header indicates an HTML document.
    pub fn accepts_html(&self) -> bool {
        self.header("accept")
            .map(|v| v.contains("text/html"))
            .unwrap_or(false)
    }
}

/// An HTTP response snapshot (status, headers, body).
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code.
    pub status: u16,
    /// Status text for the code.
    pub status_text: String,
    /// Response headers (name → value).
    pub headers: BTreeMap<String, String>,
    /// Body bytes; readable at most once.
    body: Vec<u8>,
    /// Whether the body was consumed.
    body_used: bool,
}

impl Response {
    /// Create a response with a status and body.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            status_text: String::from(status_text_for(status)),
            headers: BTreeMap::new(),
            body,
            body_used: false,
        }
    }

    /// Create a plain-text response.
    pub fn plain_text(status: u16, body: &str) -> Self {
        let mut response = Self::new(status, body.as_bytes().to_vec());
        response
            .headers
            .insert(String::from("Content-Type"), String::from("text/plain"));
        response
    }

    /// Synthetic response for a font that cannot be served offline.
    pub fn font_unavailable() -> Self {
        Self::plain_text(408, "Font not available offline")
    }

    /// Synthetic response for a general network failure with no cache hit.
    pub fn network_error() -> Self {
        Self::plain_text(408, "Network error occurred")
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the status is in the success range (200-299).
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body was consumed.
    pub fn body_used(&self) -> bool {
        self.body_used
    }

    /// Length of the body in bytes.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Consume the body. Fails on second use.
    pub fn take_body(&mut self) -> Result<Vec<u8>, BodyConsumed> {
        if self.body_used {
            return Err(BodyConsumed);
        }
        self.body_used = true;
        Ok(std::mem::take(&mut self.body))
    }

    /// Duplicate this response for dual use (return one, persist the other).
    /// Fails if the body was already consumed.
    pub fn clone_response(&self) -> Result<Self, BodyConsumed> {
        if self.body_used {
            return Err(BodyConsumed);
        }
        Ok(self.clone())
    }
}

/// Status text for common status codes.
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_get() {
        let request = Request::new("/app.js");
        assert_eq!(request.method, Method::Get);
        assert!(request.body.is_none());
    }

    #[test]
    fn header_lookup_case_insensitive() {
        let request = Request::new("/").with_header("Accept", "text/html,*/*");
        assert_eq!(request.header("accept"), Some("text/html,*/*"));
        assert_eq!(request.header("ACCEPT"), Some("text/html,*/*"));
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn accepts_html() {
        let html = Request::new("/dashboard").with_header("Accept", "text/html,application/xhtml");
        assert!(html.accepts_html());
        let json = Request::new("/api").with_header("Accept", "application/json");
        assert!(!json.accepts_html());
        let none = Request::new("/api");
        assert!(!none.accepts_html());
    }

    #[test]
    fn response_ok_range() {
        assert!(Response::new(200, Vec::new()).ok());
        assert!(Response::new(299, Vec::new()).ok());
        assert!(!Response::new(300, Vec::new()).ok());
        assert!(!Response::new(404, Vec::new()).ok());
    }

    #[test]
    fn synthetic_font_unavailable() {
        let mut response = Response::font_unavailable();
        assert_eq!(response.status, 408);
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.take_body().unwrap(), b"Font not available offline");
    }

    #[test]
    fn synthetic_network_error() {
        let mut response = Response::network_error();
        assert_eq!(response.status, 408);
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.take_body().unwrap(), b"Network error occurred");
    }

    #[test]
    fn body_consumed_once() {
        let mut response = Response::new(200, b"payload".to_vec());
        assert!(!response.body_used());
        assert_eq!(response.take_body().unwrap(), b"payload");
        assert!(response.body_used());
        assert_eq!(response.take_body(), Err(BodyConsumed));
    }

    #[test]
    fn clone_before_dual_use() {
        let mut original = Response::new(200, b"flf".to_vec());
        let mut copy = original.clone_response().unwrap();
        assert_eq!(original.take_body().unwrap(), b"flf");
        // The copy carries an unconsumed body of its own.
        assert_eq!(copy.take_body().unwrap(), b"flf");
    }

    #[test]
    fn clone_after_consumption_fails() {
        let mut response = Response::new(200, b"flf".to_vec());
        response.take_body().unwrap();
        assert_eq!(response.clone_response().err(), Some(BodyConsumed));
    }

    #[test]
    fn method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Options.as_str(), "OPTIONS");
    }
}
