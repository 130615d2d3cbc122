//! HTTP transport backends

pub mod reqwest_backend;

pub use reqwest_backend::{HttpTransport, HttpTransportBuilder};
