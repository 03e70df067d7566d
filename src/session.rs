//! Retrieval session - ties query state, connection and parser together
//!
//! A session owns one [`SearchQuery`] and one [`FetchClient`]. Each
//! [`fetch`](RetrievalSession::fetch) renders the current query, retrieves
//! the page over the persistent connection and replaces the previously
//! extracted results, spelling suggestion and index table.

use crate::config::Config;
use crate::fetcher::{Connector, Endpoint, FetchClient, HttpConnector};
use crate::parser::{parse_page, ParsedPage, ParserOptions};
use crate::query::{QueryOptions, SearchQuery};
use crate::results::{results_json, SearchResult};
use crate::{Result, SearchError};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, info, warn};

/// One interactive search session
pub struct RetrievalSession<C: Connector = HttpConnector> {
    query: SearchQuery,
    client: FetchClient<C>,
    /// Search host the client was last pointed at by the query
    query_host: String,
    browser_layout: bool,
    page: ParsedPage,
    url_table: BTreeMap<String, String>,
}

impl RetrievalSession<HttpConnector> {
    /// Opens a session against the search host selected by the configuration
    pub async fn connect(config: &Config) -> Result<Self> {
        let query = SearchQuery::new(&config.query);
        let client = FetchClient::connect_to(&query.host(), &config.connection).await?;
        Ok(Self::with_client(query, client, config.connection.user_agent))
    }
}

impl<C: Connector> RetrievalSession<C> {
    /// Creates a session over an existing client
    ///
    /// The client may point at any host; the session only reconnects when
    /// the query's country code later selects a different search host.
    pub fn with_client(query: SearchQuery, client: FetchClient<C>, browser_layout: bool) -> Self {
        let query_host = query.host();
        Self {
            query,
            client,
            query_host,
            browser_layout,
            page: ParsedPage::default(),
            url_table: BTreeMap::new(),
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Mutable access to the query; changes apply on the next fetch
    pub fn query_mut(&mut self) -> &mut SearchQuery {
        &mut self.query
    }

    pub fn client(&self) -> &FetchClient<C> {
        &self.client
    }

    /// Results of the last fetch
    pub fn results(&self) -> &[SearchResult] {
        &self.page.results
    }

    /// Spelling the backend used instead of the keywords, if it autocorrected
    pub fn suggested_spelling(&self) -> Option<&str> {
        self.page.suggested_spelling.as_deref()
    }

    /// Whether the backend omitted similar results
    pub fn filtered(&self) -> bool {
        self.page.filtered
    }

    /// Index to URL table of the last fetch
    pub fn url_table(&self) -> &BTreeMap<String, String> {
        &self.url_table
    }

    /// URL of the result or sitelink with the given index (`"3"`, `"3a"`)
    pub fn url_for(&self, index: &str) -> Option<&str> {
        self.url_table.get(index).map(String::as_str)
    }

    /// Absolute URL of the current query
    pub fn full_url(&self) -> String {
        self.query.full()
    }

    /// Results of the last fetch as a pretty-printed JSON array
    pub fn results_json(&self) -> serde_json::Result<String> {
        results_json(&self.page.results)
    }

    /// Retrieves and parses the page for the current query
    ///
    /// # Errors
    ///
    /// * `SearchError::NoKeywords` - the query has no keywords
    /// * `SearchError::Blocked` - the backend refused the query
    /// * `SearchError::Connection` - the page could not be retrieved
    pub async fn fetch(&mut self) -> Result<()> {
        if self.query.keywords().is_empty() {
            return Err(SearchError::NoKeywords);
        }

        let host = self.query.host();
        if host != self.query_host {
            info!("Search host changed from {} to {}", self.query_host, host);
            let port = self.client.endpoint().port;
            self.client.connect(Endpoint::new(host.clone(), port)).await?;
            self.query_host = host;
        }

        let target = self.query.relative();
        debug!("Opening {}", self.query.full());
        let page = self.client.fetch(&target).await?;
        dump_response(&page);

        let options = ParserOptions {
            news: self.query.is_news(),
            browser_layout: self.browser_layout,
        };
        self.page = parse_page(&page, options);
        self.url_table = self
            .page
            .results
            .iter()
            .flat_map(SearchResult::url_table)
            .collect();

        info!(
            "Fetched {} results (start={}, num={}, filtered={}, spelling={:?})",
            self.page.results.len(),
            self.query.start(),
            self.query.num(),
            self.page.filtered,
            self.page.suggested_spelling
        );
        Ok(())
    }

    /// Fetches the next page
    pub async fn next_page(&mut self) -> Result<()> {
        self.query.next_page();
        self.fetch().await
    }

    /// Fetches the previous page
    ///
    /// Fails with [`crate::NavigationError::AtFirstPage`] without fetching when
    /// already on the first page.
    pub async fn prev_page(&mut self) -> Result<()> {
        self.query.prev_page()?;
        self.fetch().await
    }

    /// Fetches the first page
    pub async fn first_page(&mut self) -> Result<()> {
        self.query.first_page()?;
        self.fetch().await
    }

    /// Repeats the search with automatic spelling correction disabled
    pub async fn exact(&mut self) -> Result<()> {
        self.query.update(&QueryOptions {
            start: Some(0),
            exact: Some(true),
            ..Default::default()
        });
        self.fetch().await
    }

    /// Repeats the search including the omitted similar results
    pub async fn unfilter(&mut self) -> Result<()> {
        self.query.update(&QueryOptions {
            start: Some(0),
            ..Default::default()
        });
        self.query.set_queries([("filter", "0")]);
        self.fetch().await
    }

    /// Searches for new keywords from the first page, keeping other options
    pub async fn new_query(&mut self, keywords: Vec<String>) -> Result<()> {
        self.query.update(&QueryOptions {
            keywords: Some(keywords),
            start: Some(0),
            ..Default::default()
        });
        self.query.unset_queries(&["filter"]);
        self.fetch().await
    }

    /// Closes the underlying connection; a later fetch reconnects
    pub fn close(&mut self) {
        self.client.close();
    }
}

/// Writes the raw page to a temporary file when debug logging is enabled
fn dump_response(page: &str) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let dumped = tempfile::Builder::new()
        .prefix("serpline-")
        .suffix(".html")
        .tempfile()
        .and_then(|mut file| {
            file.write_all(page.as_bytes())?;
            file.keep().map_err(|e| e.error)
        });
    match dumped {
        Ok((_, path)) => debug!("Response body written to {}", path.display()),
        Err(e) => warn!("Failed to dump response body: {}", e),
    }
}
