//! Extracted search results
//!
//! A [`SearchResult`] is built once per result container whose title link
//! yielded a URL. Results carry string indices: the 1-based position of the
//! result on the page, and for sitelinks the parent index followed by a
//! letter (`3a`, `3b`, ...).

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A secondary link shown beneath a result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sitelink {
    #[serde(skip)]
    pub index: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub title: String,
    pub url: String,
}

impl Sitelink {
    pub fn new(title: impl Into<String>, url: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            index: String::new(),
            title: title.into(),
            url: url.into(),
            abstract_text: abstract_text.into(),
        }
    }
}

/// One search result
///
/// Serializes to an object with `title`, `url` and `abstract`, plus
/// `metadata` and `sitelinks` when present. Fields are declared in
/// serialized key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    #[serde(skip)]
    pub index: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Publisher and age line of news results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sitelinks: Vec<Sitelink>,
    pub title: String,
    pub url: String,
}

impl SearchResult {
    /// Creates a result at the given 1-based position, numbering its sitelinks
    pub fn new(
        position: usize,
        title: impl Into<String>,
        url: impl Into<String>,
        abstract_text: impl Into<String>,
        metadata: Option<String>,
        mut sitelinks: Vec<Sitelink>,
    ) -> Self {
        let index = position.to_string();
        for (i, sitelink) in sitelinks.iter_mut().enumerate() {
            sitelink.index = format!("{}{}", index, letter_suffix(i));
        }

        Self {
            index,
            title: title.into(),
            url: url.into(),
            abstract_text: abstract_text.into(),
            metadata,
            sitelinks,
        }
    }

    /// Index to URL entries for this result and its sitelinks
    pub fn url_table(&self) -> BTreeMap<String, String> {
        std::iter::once((self.index.clone(), self.url.clone()))
            .chain(
                self.sitelinks
                    .iter()
                    .map(|sitelink| (sitelink.index.clone(), sitelink.url.clone())),
            )
            .collect()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " {:>2}. {}", self.index, self.title)?;
        writeln!(f, "     {}", self.url)?;
        if let Some(metadata) = &self.metadata {
            writeln!(f, "     {}", metadata)?;
        }
        if !self.abstract_text.is_empty() {
            writeln!(f, "     {}", self.abstract_text)?;
        }
        for sitelink in &self.sitelinks {
            writeln!(f)?;
            writeln!(f, "     {:>4}. {}", sitelink.index, sitelink.title)?;
            writeln!(f, "           {}", sitelink.url)?;
            if !sitelink.abstract_text.is_empty() {
                writeln!(f, "           {}", sitelink.abstract_text)?;
            }
        }
        Ok(())
    }
}

/// Pretty-printed JSON array of the given results
pub fn results_json(results: &[SearchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// `a`, `b`, ..., `z`, `aa`, `ab`, ...
fn letter_suffix(mut n: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'a' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn to_json(result: &SearchResult) -> Value {
        serde_json::to_value(result).unwrap()
    }

    fn sample() -> SearchResult {
        SearchResult::new(
            3,
            "Example",
            "http://example.com/",
            "An example site.",
            None,
            vec![
                Sitelink::new("Docs", "http://example.com/docs", "Read the docs."),
                Sitelink::new("Blog", "http://example.com/blog", ""),
            ],
        )
    }

    #[test]
    fn test_sitelink_indices() {
        let result = sample();
        assert_eq!(result.index, "3");
        assert_eq!(result.sitelinks[0].index, "3a");
        assert_eq!(result.sitelinks[1].index, "3b");
    }

    #[test]
    fn test_letter_suffix() {
        assert_eq!(letter_suffix(0), "a");
        assert_eq!(letter_suffix(25), "z");
        assert_eq!(letter_suffix(26), "aa");
        assert_eq!(letter_suffix(27), "ab");
    }

    #[test]
    fn test_url_table() {
        let table = sample().url_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table["3"], "http://example.com/");
        assert_eq!(table["3a"], "http://example.com/docs");
        assert_eq!(table["3b"], "http://example.com/blog");
    }

    #[test]
    fn test_url_table_without_sitelinks() {
        let result = SearchResult::new(2, "T", "http://t/", "", None, Vec::new());
        let table = result.url_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table["2"], "http://t/");
    }

    #[test]
    fn test_json_projection() {
        let plain = SearchResult::new(1, "T", "http://t/", "A", None, Vec::new());
        assert_eq!(
            to_json(&plain),
            json!({"title": "T", "url": "http://t/", "abstract": "A"})
        );

        let value = to_json(&sample());
        assert!(value.get("metadata").is_none());
        let sitelinks = value["sitelinks"].as_array().expect("sitelinks array");
        assert_eq!(sitelinks.len(), 2);
        assert_eq!(
            sitelinks[0],
            json!({"title": "Docs", "url": "http://example.com/docs", "abstract": "Read the docs."})
        );

        let news = SearchResult::new(
            1,
            "T",
            "http://t/",
            "A",
            Some("Reuters, 2 hours ago".to_string()),
            Vec::new(),
        );
        assert_eq!(to_json(&news)["metadata"], "Reuters, 2 hours ago");
    }

    #[test]
    fn test_results_json_key_order() {
        let text = results_json(&[sample()]).unwrap();
        let abstract_at = text.find("\"abstract\"").unwrap();
        let sitelinks_at = text.find("\"sitelinks\"").unwrap();
        let title_at = text.find("\"title\": \"Example\"").unwrap();
        assert!(abstract_at < sitelinks_at && sitelinks_at < title_at);
        assert!(!text.contains("index"));
    }

    #[test]
    fn test_results_json_keeps_unicode() {
        let result = SearchResult::new(1, "Café", "http://t/", "", None, Vec::new());
        let text = results_json(&[result]).expect("serializes");
        assert!(text.starts_with('['));
        assert!(text.contains("Café"));
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.starts_with("  3. Example\n     http://example.com/\n"));
        assert!(text.contains("3a. Docs"));
        assert!(text.contains("http://example.com/blog"));
    }
}
