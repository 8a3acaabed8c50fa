//! Localization module
//!
//! Locale detection, text direction, and the handful of strings the
//! suggestion panel needs in both storefront languages.

use std::collections::HashMap;

/// Supported languages
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[("ar", "العربية"), ("en", "English")];

/// Right-to-left languages
pub const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur"];

/// Text direction for layout and alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Current display locale as seen by a search controller.
///
/// The controller does not detect the locale; the surrounding page feeds it
/// this signal and may replace it at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSignal {
    pub locale: String,
    pub is_rtl: bool,
}

impl LocaleSignal {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: base_code(locale),
            is_rtl: is_rtl(locale),
        }
    }

    /// Whether item names should come from the alternate-locale field.
    ///
    /// Only the configured alternate language qualifies: the alternate name
    /// is written in that language, so other RTL locales keep the primary.
    pub fn prefers_alt(&self, alternate_locale: &str) -> bool {
        self.locale == base_code(alternate_locale)
    }

    pub fn direction(&self) -> Direction {
        if self.is_rtl {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }
}

impl Default for LocaleSignal {
    fn default() -> Self {
        Self::new("ar")
    }
}

/// Primary language subtag, lowercased: `AR-eg` -> `ar`
fn base_code(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Parse Accept-Language header and return best matching locale
pub fn parse_accept_language(header: &str) -> Option<String> {
    // Parse header like "ar-EG,ar;q=0.9,en;q=0.8"
    let mut locales: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut parts = part.trim().split(';');
            let lang = parts.next()?.trim().to_string();

            let quality = parts
                .next()
                .and_then(|q| q.trim().strip_prefix("q=").and_then(|v| v.parse().ok()))
                .unwrap_or(1.0);

            Some((lang, quality))
        })
        .collect();

    // Sort by quality descending
    locales.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (lang, _) in locales {
        let base = base_code(&lang);
        if SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == base) {
            return Some(base);
        }
    }

    None
}

/// Check if a language is right-to-left
pub fn is_rtl(lang: &str) -> bool {
    RTL_LANGUAGES.contains(&base_code(lang).as_str())
}

/// Suggestion panel labels
pub struct Translations {
    translations: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Translations {
    pub fn new() -> Self {
        let mut translations = HashMap::new();

        let mut en = HashMap::new();
        en.insert("suggestions", "Suggestions");
        en.insert("recent_searches", "Recent searches");
        en.insert("loading", "Searching...");
        en.insert("no_results", "No suggestions");
        translations.insert("en", en);

        let mut ar = HashMap::new();
        ar.insert("suggestions", "اقتراحات");
        ar.insert("recent_searches", "عمليات البحث الأخيرة");
        ar.insert("loading", "جاري البحث...");
        ar.insert("no_results", "لا توجد اقتراحات");
        translations.insert("ar", ar);

        Self { translations }
    }

    /// Get a translation for a key, falling back to English
    pub fn get(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.translations
            .get(base_code(lang).as_str())
            .and_then(|t| t.get(key))
            .or_else(|| self.translations.get("en").and_then(|t| t.get(key)))
            .copied()
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::new()
    }
}
