//! Settings structures for storefront-search configuration

use crate::suggest::SearchDomain;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub suggest: SuggestSettings,
    pub history: HistorySettings,
    pub locale: LocaleSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (STOREFRONT_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("STOREFRONT_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("STOREFRONT_API_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = std::env::var("STOREFRONT_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.suggest.debounce_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("STOREFRONT_HISTORY_DIR") {
            self.history.storage_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("STOREFRONT_LOCALE") {
            self.locale.default_locale = val;
        }
    }

    /// Endpoint path for a search domain, falling back to the built-in default
    pub fn endpoint(&self, domain: SearchDomain) -> &str {
        self.api
            .endpoints
            .get(domain.as_str())
            .map(|s| s.as_str())
            .unwrap_or_else(|| domain.default_endpoint())
    }

    /// Directory holding persisted recent searches
    pub fn history_dir(&self) -> PathBuf {
        self.history.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|p| p.join("storefront-search"))
                .unwrap_or_else(|| PathBuf::from(".storefront-search"))
        })
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Storefront name shown by the driver
    pub app_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            app_name: "Storefront".to_string(),
        }
    }
}

/// Remote REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is resolved against
    pub base_url: String,
    /// Request timeout in seconds (none = transport default)
    pub request_timeout: Option<f64>,
    /// Endpoint path per search domain (products, factories, offers, site)
    pub endpoints: HashMap<String, String>,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            request_timeout: None,
            endpoints: HashMap::new(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Suggestion fetching behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestSettings {
    /// Quiet period before a request is issued
    pub debounce_ms: u64,
    /// Maximum suggestions requested and displayed
    pub max_suggestions: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            debounce_ms: crate::DEFAULT_DEBOUNCE_MS,
            max_suggestions: crate::MAX_SUGGESTIONS,
        }
    }
}

/// Recent search history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum remembered searches per domain
    pub max_entries: usize,
    /// Directory for persisted lists (none = platform data dir)
    pub storage_dir: Option<PathBuf>,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_entries: crate::MAX_RECENT_SEARCHES,
            storage_dir: None,
        }
    }
}

/// Locale settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    /// Locale the controller starts in
    pub default_locale: String,
    /// Locale whose names come from the alternate field of an item
    pub alternate_locale: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default_locale: "ar".to_string(),
            alternate_locale: "ar".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.suggest.debounce_ms, 1000);
        assert_eq!(settings.suggest.max_suggestions, 5);
        assert_eq!(settings.history.max_entries, 5);
        assert!(!settings.general.debug);
    }

    #[test]
    fn test_endpoint_fallback() {
        let mut settings = Settings::default();
        assert_eq!(settings.endpoint(SearchDomain::Products), "products");

        settings
            .api
            .endpoints
            .insert("products".to_string(), "catalog/search".to_string());
        assert_eq!(settings.endpoint(SearchDomain::Products), "catalog/search");
        assert_eq!(settings.endpoint(SearchDomain::Offers), "offers");
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "api:\n  base_url: https://shop.example/api/\nsuggest:\n  debounce_ms: 250\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.api.base_url, "https://shop.example/api/");
        assert_eq!(settings.suggest.debounce_ms, 250);
        assert_eq!(settings.suggest.max_suggestions, 5);
        assert_eq!(settings.locale.default_locale, "ar");
    }
}
