//! Query highlighting in suggestion labels

use regex::{Regex, RegexBuilder};

/// A label split around the first occurrence of the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

/// Case-insensitive literal matcher for one query, reused across labels
#[derive(Debug, Clone)]
pub struct Highlighter {
    query: String,
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(query: &str) -> Self {
        let pattern = if query.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self {
            query: query.to_string(),
            pattern,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// First occurrence of the query in `text`, `None` for an empty query
    pub fn find<'a>(&self, text: &'a str) -> Option<Highlight<'a>> {
        let m = self.pattern.as_ref()?.find(text)?;

        Some(Highlight {
            before: &text[..m.start()],
            matched: m.as_str(),
            after: &text[m.end()..],
        })
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new("")
    }
}

/// Find the first case-insensitive occurrence of `query` in `text`.
///
/// Returns `None` for an empty query or when nothing matches. Only the first
/// occurrence is reported.
pub fn highlight<'a>(text: &'a str, query: &str) -> Option<Highlight<'a>> {
    Highlighter::new(query).find(text)
}

/// Render `text` as HTML with the first match wrapped in `<mark>`
pub fn highlight_html(text: &str, query: &str) -> String {
    match highlight(text, query) {
        Some(h) => format!(
            "{}<mark>{}</mark>{}",
            escape_html(h.before),
            escape_html(h.matched),
            escape_html(h.after)
        ),
        None => escape_html(text),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_only() {
        let h = highlight("Rice and rice flour", "rice").unwrap();
        assert_eq!(h.before, "");
        assert_eq!(h.matched, "Rice");
        assert_eq!(h.after, " and rice flour");
    }

    #[test]
    fn test_no_match_or_empty_query() {
        assert_eq!(highlight("Sugar", "salt"), None);
        assert_eq!(highlight("Sugar", ""), None);
        assert_eq!(highlight_html("Sugar", ""), "Sugar");
    }

    #[test]
    fn test_query_is_literal() {
        let h = highlight("Oil (1.5L)", "(1.5").unwrap();
        assert_eq!(h.matched, "(1.5");
        assert_eq!(highlight("Oil 1x5L", "1.5"), None);
    }

    #[test]
    fn test_arabic_text() {
        let h = highlight("زيت زيتون", "زيتون").unwrap();
        assert_eq!(h.before, "زيت ");
        assert_eq!(h.matched, "زيتون");
        assert_eq!(h.after, "");
    }

    #[test]
    fn test_highlighter_reused_across_labels() {
        let h = Highlighter::new("MI");
        assert_eq!(h.query(), "MI");
        assert_eq!(h.find("Milk").unwrap().matched, "Mi");
        assert_eq!(h.find("Semi skimmed").unwrap().before, "Se");
        assert_eq!(h.find("Tea"), None);
        assert_eq!(Highlighter::default().find("Tea"), None);
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            highlight_html("Salt & <Pepper>", "pepper"),
            "Salt &amp; &lt;<mark>Pepper</mark>&gt;"
        );
    }
}
