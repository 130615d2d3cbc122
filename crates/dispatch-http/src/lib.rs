//! Typed HTTP request execution layer
//!
//! This crate executes declaratively described HTTP requests and returns
//! either a strongly typed decoded response or one case of a closed error
//! taxonomy, so callers never branch on raw transport errors.
//!
//! A call is described by an [`ApiRequest`] implementation (endpoint, method,
//! headers, body, expected response shape) and executed by [`ApiClient`],
//! which drives a swappable [`Transport`]. The default transport is
//! [`HttpTransport`] over `reqwest`; tests inject a scripted transport
//! instead of touching the network.
//!
//! # Example
//!
//! ```no_run
//! use dispatch_http::{ApiClient, ApiError, ApiRequest, HttpMethod};
//! use serde::Deserialize;
//! use url::Url;
//!
//! #[derive(Deserialize)]
//! struct Profile {
//!     name: String,
//! }
//!
//! struct GetProfile;
//!
//! impl ApiRequest for GetProfile {
//!     type Response = Profile;
//!
//!     fn endpoint(&self) -> Option<Url> {
//!         Url::parse("https://api.example.com/profile").ok()
//!     }
//!
//!     fn method(&self) -> HttpMethod {
//!         HttpMethod::Get
//!     }
//! }
//!
//! async fn example() -> Result<Profile, ApiError> {
//!     let client = ApiClient::default();
//!     client.perform(&GetProfile).await
//! }
//! ```

mod backends;
mod client;
mod error;
mod request;
mod transport;

pub use backends::{HttpTransport, HttpTransportBuilder};
pub use client::ApiClient;
pub use error::{ApiError, TransportError};
pub use request::{ApiRequest, HttpMethod, NonFiniteNumber, ParamValue};
pub use transport::{RawResponse, Transport, WireRequest};
