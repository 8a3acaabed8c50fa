//! Request and response types for the storefront REST API

use std::collections::HashMap;

/// GET request against the storefront API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Absolute URL to request
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            params: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// HTTP response from the API
#[derive(Debug)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl ApiResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.text)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
