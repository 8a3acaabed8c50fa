//! storefront-search: typeahead suggestions and recent-search history for a
//! bilingual (Arabic/English) wholesale storefront.
//!
//! A [`SearchController`] debounces input, fetches suggestions from the
//! storefront REST API, merges them with the locally persisted recent
//! searches, and handles keyboard selection over the combined list.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod highlight;
pub mod history;
pub mod locales;
pub mod navigator;
pub mod network;
pub mod suggest;

pub use config::Settings;
pub use controller::{ControllerConfig, NavigationRequest, SearchController};
pub use history::RecentHistory;
pub use suggest::{SearchDomain, SuggestionItem, SuggestionSource};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quiet period before a suggestion request is issued, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Maximum suggestions requested and shown
pub const MAX_SUGGESTIONS: usize = 5;

/// Maximum recent searches remembered per domain
pub const MAX_RECENT_SEARCHES: usize = 5;
