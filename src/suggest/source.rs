//! Suggestion sources

use super::{SearchDomain, SuggestionItem};
use crate::error::FetchError;
use crate::network::{ApiRequest, HttpClient};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::RwLock;
use url::Url;

/// Trait for anything that can answer a typeahead query
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Source name, used in diagnostics
    fn name(&self) -> &str;

    /// Fetch suggestions for a query, optionally narrowed to a scope
    async fn suggest(
        &self,
        query: &str,
        scope: Option<&Scope>,
    ) -> Result<Vec<SuggestionItem>, FetchError>;

    /// Display language for later requests; sources without one ignore it
    fn set_language(&self, _language: &str) {}
}

/// Narrows a search to one category or one factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Category(String),
    Factory(String),
}

impl Scope {
    /// Query parameter carrying the scope
    pub fn param(&self) -> (&'static str, &str) {
        match self {
            Scope::Category(id) => ("category_id", id),
            Scope::Factory(id) => ("factory_id", id),
        }
    }
}

/// Envelope returned by the storefront list endpoints
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: serde_json::Value,
    #[serde(default, alias = "name_en", alias = "title")]
    name: Option<String>,
    #[serde(default, alias = "nameAr", alias = "title_ar")]
    name_ar: Option<String>,
    #[serde(default, alias = "image_url", alias = "imageUrl", alias = "thumbnail")]
    image: Option<String>,
}

/// Suggestion source backed by a storefront list endpoint.
///
/// Issues `GET {base}/{endpoint}?search=..&page=1&limit=N` and reads the
/// `data` array of the response.
pub struct RemoteSource {
    client: HttpClient,
    endpoint: Url,
    domain: SearchDomain,
    limit: usize,
    accept_language: RwLock<Option<String>>,
}

impl RemoteSource {
    pub fn new(
        client: HttpClient,
        base_url: &str,
        endpoint: &str,
        domain: SearchDomain,
    ) -> Result<Self, FetchError> {
        // Without the trailing slash `join` would drop the last base segment
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        let endpoint = base.join(endpoint.trim_start_matches('/'))?;

        Ok(Self {
            client,
            endpoint,
            domain,
            limit: crate::MAX_SUGGESTIONS,
            accept_language: RwLock::new(None),
        })
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.accept_language = RwLock::new(Some(lang.into()));
        self
    }

    pub fn domain(&self) -> SearchDomain {
        self.domain
    }

    fn to_item(&self, raw: RawItem) -> SuggestionItem {
        let id = match raw.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let image_url = raw.image.filter(|s| !s.is_empty()).map(|image| {
            // Relative paths are served from the API host
            match Url::parse(&image) {
                Ok(_) => image,
                Err(_) => self
                    .endpoint
                    .join(&image)
                    .map(|u| u.to_string())
                    .unwrap_or(image),
            }
        });

        SuggestionItem {
            id,
            display_name: raw.name.unwrap_or_default(),
            display_name_alt: raw.name_ar.unwrap_or_default(),
            image_url,
        }
    }
}

#[async_trait]
impl SuggestionSource for RemoteSource {
    fn name(&self) -> &str {
        self.domain.as_str()
    }

    fn set_language(&self, language: &str) {
        if let Ok(mut current) = self.accept_language.write() {
            *current = Some(language.to_string());
        }
    }

    async fn suggest(
        &self,
        query: &str,
        scope: Option<&Scope>,
    ) -> Result<Vec<SuggestionItem>, FetchError> {
        let mut request = ApiRequest::get(self.endpoint.as_str())
            .param("search", query)
            .param("page", "1")
            .param("limit", self.limit.to_string());

        if let Some(scope) = scope {
            let (key, value) = scope.param();
            request = request.param(key, value);
        }
        let language = self
            .accept_language
            .read()
            .ok()
            .and_then(|lang| lang.clone());
        if let Some(lang) = language {
            request = request.header("Accept-Language", lang);
        }

        let response = self.client.execute(request).await?;

        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }

        let list: ListResponse = response.json()?;

        Ok(list
            .data
            .into_iter()
            .take(self.limit)
            .map(|raw| self.to_item(raw))
            .collect())
    }
}
