//! Serpline: a search-results retrieval pipeline
//!
//! This crate fetches a search-results page over HTTPS, tolerating transient
//! connection failures and redirects, and extracts an ordered list of
//! structured results from its markup while keeping track of query and
//! pagination state across repeated fetches.

pub mod config;
pub mod fetcher;
pub mod parser;
pub mod query;
pub mod results;
pub mod session;

use thiserror::Error;

/// Main error type for Serpline operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Connection blocked due to unusual activity (redirected to {location})")]
    Blocked { location: String },

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("No keywords")]
    NoKeywords,
}

impl SearchError {
    /// Returns true if the backend refused to serve the query
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Unrecoverable failures of the fetch layer
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to connect to proxy server {proxy} for {host}: {source}")]
    Proxy {
        proxy: String,
        host: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to get '{target}': {source}")]
    Request {
        target: String,
        #[source]
        source: TransportError,
    },

    #[error("Got HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid redirect location: {location}")]
    InvalidRedirect { location: String },

    #[error("Failed to decode response body: {message}")]
    Decode { message: String },
}

/// Low-level transport failures (DNS, TCP, TLS, timeouts, resets)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns true if the peer could not be reached at all
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::AddrNotAvailable
            ),
        }
    }
}

/// Pagination boundary conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Already at the first page.")]
    AtFirstPage,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
}

/// Result type alias for Serpline operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::FetchClient;
pub use parser::{parse_page, ParsedPage, ParserOptions};
pub use query::{QueryOptions, SearchQuery};
pub use results::{SearchResult, Sitelink};
pub use session::RetrievalSession;
