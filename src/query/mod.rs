//! Query and pagination state
//!
//! [`SearchQuery`] owns every parameter of the search request and renders
//! them into a canonical request target whose query keys are always sorted,
//! so the same state produces byte-identical requests.

pub mod domains;

use crate::NavigationError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Scheme of every search request
pub const SCHEME: &str = "https";

/// Path of the search endpoint
pub const SEARCH_PATH: &str = "/search";

/// Results per page when nothing else is requested
pub const DEFAULT_NUM: u32 = 10;

/// A partial set of query options
///
/// Only the fields that are `Some` are applied by [`SearchQuery::update`];
/// `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Time restriction, e.g. `d5` for the past five days
    pub duration: Option<String>,

    /// Disable automatic spelling correction
    pub exact: Option<bool>,

    /// Search keywords
    pub keywords: Option<Vec<String>>,

    /// Interface language
    pub lang: Option<String>,

    /// Search the news section
    pub news: Option<bool>,

    /// Results per page
    pub num: Option<u32>,

    /// Restrict results to a site
    pub site: Option<String>,

    /// Offset of the first result
    pub start: Option<u32>,

    /// Country/domain code selecting the search host
    pub tld: Option<String>,
}

impl QueryOptions {
    /// Replaces every field that `other` sets
    pub fn overlay(&mut self, other: QueryOptions) {
        macro_rules! take_set {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take_set!(duration, exact, keywords, lang, news, num, site, start, tld);
    }
}

/// Query state for one search
#[derive(Debug, Clone)]
pub struct SearchQuery {
    tld: Option<String>,
    num: u32,
    start: u32,
    keywords: Vec<String>,
    site: Option<String>,
    params: String,
    query: BTreeMap<String, String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        let mut query = BTreeMap::new();
        query.insert("ie".to_string(), "UTF-8".to_string());
        query.insert("oe".to_string(), "UTF-8".to_string());

        Self {
            tld: None,
            num: DEFAULT_NUM,
            start: 0,
            keywords: Vec::new(),
            site: None,
            params: String::new(),
            query,
        }
    }
}

impl SearchQuery {
    /// Creates a query from initial options
    pub fn new(options: &QueryOptions) -> Self {
        let mut query = Self::default();
        query.update(options);
        query
    }

    /// Merges the given options into the current state
    ///
    /// Absent options are left as they are. Empty `duration` and `lang`
    /// values are ignored.
    pub fn update(&mut self, options: &QueryOptions) {
        if let Some(duration) = options.duration.as_deref().filter(|d| !d.is_empty()) {
            self.query
                .insert("tbs".to_string(), format!("qdr:{}", duration));
        }
        if let Some(exact) = options.exact {
            if exact {
                self.query.insert("nfpr".to_string(), "1".to_string());
            } else {
                self.query.remove("nfpr");
            }
        }
        if let Some(keywords) = &options.keywords {
            self.keywords = keywords.clone();
        }
        if let Some(lang) = options.lang.as_deref().filter(|l| !l.is_empty()) {
            self.query.insert("hl".to_string(), lang.to_string());
        }
        if let Some(news) = options.news {
            if news {
                self.query.insert("tbm".to_string(), "nws".to_string());
            } else {
                self.query.remove("tbm");
            }
        }
        if let Some(num) = options.num {
            self.num = num;
        }
        if let Some(site) = &options.site {
            self.site = Some(site.clone()).filter(|s| !s.is_empty());
        }
        if let Some(start) = options.start {
            self.start = start;
        }
        if let Some(tld) = &options.tld {
            self.tld = Some(tld.clone());
        }
    }

    /// Forces query keys outside the normal [`update`](Self::update) mechanism
    ///
    /// `q`, `num` and `start` are always synthesized when rendering, so
    /// setting them here has no effect.
    pub fn set_queries<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.query.insert(key.into(), value.into());
        }
    }

    /// Removes query keys; missing keys are ignored
    pub fn unset_queries(&mut self, keys: &[&str]) {
        for key in keys {
            self.query.remove(*key);
        }
    }

    /// Sets the `;params` path segment; an empty string removes it
    pub fn set_params(&mut self, params: impl Into<String>) {
        self.params = params.into();
    }

    pub fn params(&self) -> &str {
        &self.params
    }

    /// Advances to the next page
    pub fn next_page(&mut self) {
        self.start = self.start.saturating_add(self.num);
    }

    /// Goes back one page, clamping at the first page
    pub fn prev_page(&mut self) -> Result<(), NavigationError> {
        if self.start == 0 {
            return Err(NavigationError::AtFirstPage);
        }
        self.start = self.start.saturating_sub(self.num);
        Ok(())
    }

    /// Jumps back to the first page
    pub fn first_page(&mut self) -> Result<(), NavigationError> {
        if self.start == 0 {
            return Err(NavigationError::AtFirstPage);
        }
        self.start = 0;
        Ok(())
    }

    /// The search host for the current country code
    pub fn host(&self) -> String {
        domains::host_for(self.tld.as_deref())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    /// Whether the query targets the news section
    pub fn is_news(&self) -> bool {
        self.query.get("tbm").map(String::as_str) == Some("nws")
    }

    /// Renders the query string with keys in sorted order
    pub fn query_string(&self) -> String {
        let mut query = self.query.clone();
        query.insert("num".to_string(), self.num.to_string());
        query.insert("start".to_string(), self.start.to_string());
        query.insert("q".to_string(), self.q());

        query
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// The request target relative to the host
    pub fn relative(&self) -> String {
        let mut target = SEARCH_PATH.to_string();
        if !self.params.is_empty() {
            target.push(';');
            target.push_str(&self.params);
        }
        target.push('?');
        target.push_str(&self.query_string());
        target
    }

    /// The absolute URL of the current query
    pub fn full(&self) -> String {
        format!("{}://{}{}", SCHEME, self.host(), self.relative())
    }

    /// Synthesizes the `q` parameter from keywords and site restriction
    fn q(&self) -> String {
        let mut q = self
            .keywords
            .iter()
            .map(|keyword| quote_plus(keyword))
            .collect::<Vec<_>>()
            .join("+");

        if let Some(site) = &self.site {
            q.push_str("+site:");
            q.push_str(&quote_plus(site));
        }
        q
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full())
    }
}

/// Percent-encodes a query component, encoding spaces as `+`
fn quote_plus(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}
