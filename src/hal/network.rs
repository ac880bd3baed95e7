//! Network transport contract
//!
//! HTTP/TLS and Wi-Fi association live behind [`NetworkTransport`]; the core
//! only sees request/response pairs.

use std::time::Duration;
use thiserror::Error;

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status in [200, 300)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure (no HTTP status was obtained)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network not connected")]
    NotConnected,

    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("empty URL")]
    EmptyUrl,

    #[error("transport error: {0}")]
    Other(String),
}

/// Blocking HTTP client
pub trait NetworkTransport {
    /// Whether the link is currently up
    fn is_connected(&self) -> bool {
        true
    }

    /// Background link maintenance (reconnects etc.)
    fn update(&mut self, _now_ms: u64) {}

    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;

    fn post(
        &mut self,
        url: &str,
        body: &str,
        content_type: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(300, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
