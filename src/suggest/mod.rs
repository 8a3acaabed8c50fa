//! Search suggestions
//!
//! Remote suggestion sources for each storefront search domain, and the
//! debounced fetcher that feeds their results to a controller.

mod fetcher;
mod source;

pub use fetcher::{FetchEvent, SuggestionFetcher};
pub use source::{RemoteSource, Scope, SuggestionSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One remote search hit shown while the user types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub id: String,
    /// Name in the primary locale
    pub display_name: String,
    /// Name in the alternate locale; may be empty
    pub display_name_alt: String,
    pub image_url: Option<String>,
}

impl SuggestionItem {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        display_name_alt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            display_name_alt: display_name_alt.into(),
            image_url: None,
        }
    }

    /// Name to show and commit: the alternate name when it is preferred and
    /// present, the primary name otherwise.
    pub fn label(&self, prefer_alt: bool) -> &str {
        if prefer_alt && !self.display_name_alt.is_empty() {
            &self.display_name_alt
        } else {
            &self.display_name
        }
    }
}

/// Search context with its own endpoint and recent-search list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDomain {
    Products,
    Factories,
    Offers,
    /// Site-wide search box in the header
    Site,
}

impl SearchDomain {
    pub const ALL: [SearchDomain; 4] = [
        SearchDomain::Products,
        SearchDomain::Factories,
        SearchDomain::Offers,
        SearchDomain::Site,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDomain::Products => "products",
            SearchDomain::Factories => "factories",
            SearchDomain::Offers => "offers",
            SearchDomain::Site => "site",
        }
    }

    /// Key the recent-search list is persisted under
    pub fn storage_key(&self) -> &'static str {
        match self {
            SearchDomain::Products => "recentProductSearches",
            SearchDomain::Factories => "recentFactorySearches",
            SearchDomain::Offers => "recentOfferSearches",
            SearchDomain::Site => "recentSearches",
        }
    }

    /// Endpoint path used when settings do not override it
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            SearchDomain::Products | SearchDomain::Site => "products",
            SearchDomain::Factories => "factories",
            SearchDomain::Offers => "offers",
        }
    }
}

impl fmt::Display for SearchDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchDomain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "products" | "product" => Ok(SearchDomain::Products),
            "factories" | "factory" | "companies" => Ok(SearchDomain::Factories),
            "offers" | "offer" => Ok(SearchDomain::Offers),
            "site" | "all" => Ok(SearchDomain::Site),
            _ => Err(anyhow::anyhow!("Unknown search domain: {}", s)),
        }
    }
}
