//! Error types for request execution

use thiserror::Error;

/// Classified request failure.
///
/// Every failure path in [`ApiClient::perform`](crate::ApiClient::perform)
/// terminates in exactly one of these cases; no other error shape crosses the
/// executor boundary. The display strings are stable and suitable for direct
/// display. Diagnostic detail (serde paths, transport causes) is logged via
/// `tracing` and intentionally kept out of the error value so callers can
/// match exhaustively.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The contract declared no endpoint; no request was issued
    #[error("invalid request: no endpoint")]
    InvalidRequest,
    /// The request body could not be encoded; no request was issued
    #[error("failed to encode request body")]
    EncodingError,
    /// The response body could not be decoded into the expected type
    #[error("failed to decode server response")]
    DecodingError,
    /// The server returned a non-2xx status other than 401
    #[error("server returned status {0}")]
    ServerError(u16),
    /// The response was not a proper HTTP response
    #[error("unexpected response from server")]
    UnexpectedResponse,
    /// The transport reported a loss of network connectivity
    #[error("no network connectivity")]
    NoConnectivity,
    /// The server returned 401
    #[error("authentication failed: please sign in again")]
    AuthenticationFailure,
    /// Any failure not covered by the cases above
    #[error("unknown error")]
    UnknownError,
}

/// Errors a [`Transport`](crate::Transport) implementation may report.
///
/// This is the input to the executor's error mapping and never crosses the
/// [`perform`](crate::ApiClient::perform) boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),
    /// Request timeout
    #[error("request timeout")]
    Timeout,
    /// The peer answered with something that is not an HTTP response
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_body() || err.is_decode() {
            TransportError::Malformed(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}
