//! HTTP networking module
//!
//! Provides HTTP client functionality for making requests to the storefront API.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{ApiRequest, ApiResponse};
