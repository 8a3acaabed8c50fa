//! HTTP client for talking to the storefront API

use super::request::{ApiRequest, ApiResponse};
use crate::config::ApiSettings;
use crate::error::FetchError;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper with storefront-specific defaults
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    extra_headers: HashMap<String, String>,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_settings(&ApiSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &ApiSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder().gzip(true).brotli(true);

        // No timeout unless configured: the transport default applies
        if let Some(secs) = settings.request_timeout {
            let timeout = Duration::try_from_secs_f64(secs)
                .map_err(|e| anyhow::anyhow!("Invalid api.request_timeout {}: {}", secs, e))?;
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            extra_headers: settings.extra_headers.clone(),
            user_agent: format!("storefront-search/{}", crate::VERSION),
        })
    }

    /// Execute a request
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
        let mut req_builder = self
            .client
            .get(&request.url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        for (key, value) in self.extra_headers.iter().chain(request.headers.iter()) {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        debug!("GET {} {:?}", request.url, request.params);

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// GET request with parameters
    pub async fn get_with_params(
        &self,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<ApiResponse, FetchError> {
        let mut request = ApiRequest::get(url);
        request.params = params;
        self.execute(request).await
    }

    /// Parse response into ApiResponse
    async fn parse_response(response: Response) -> Result<ApiResponse, FetchError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let text = response.text().await?;

        Ok(ApiResponse { status, text, url })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
