//! HTTP transport trait with wire-level request and response types

use std::fmt::Debug;

use async_trait::async_trait;
use url::Url;

use crate::error::TransportError;
use crate::request::HttpMethod;

/// A fully formed wire-level HTTP request.
///
/// Produced by the executor once a contract has been completely evaluated;
/// transports receive nothing else.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute request URL
    pub url: Url,
    /// Outgoing headers in append order; names may repeat
    pub headers: Vec<(String, String)>,
    /// Request body, absent for body-less calls
    pub body: Option<Vec<u8>>,
}

/// Raw HTTP response: status code, headers and body bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawResponse {
    /// Create a new response from its wire-level parts
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the response headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Get the response body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the response, returning the body bytes
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Expected HTTP transport.
///
/// A transport performs one byte-level HTTP exchange. It must not interpret
/// status codes and must not decode bodies; both judgments belong to the
/// executor. Implementations must be safe for concurrent use by simultaneous
/// calls. The default implementation is
/// [`HttpTransport`](crate::HttpTransport); tests script the trait directly
/// with canned payloads instead of real network I/O.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Execute a wire-level request, returning the raw response
    async fn execute(&self, request: WireRequest) -> Result<RawResponse, TransportError>;
}
