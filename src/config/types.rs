use crate::query::QueryOptions;
use serde::Deserialize;

/// Default connect/read timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Main configuration structure for Serpline
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Initial query options
    #[serde(default)]
    pub query: QueryOptions,

    /// Connection behaviour
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Timeout applied to both connect and read operations (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// HTTPS proxy to tunnel through, as HOST:PORT
    pub proxy: Option<String>,

    /// Whether to send a browser-like User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: bool,

    /// Use TLS; only disabled when talking to local test servers
    pub secure: bool,

    /// Port override for the search host
    pub port: Option<u16>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy: None,
            user_agent: true,
            secure: true,
            port: None,
        }
    }
}

impl ConnectionConfig {
    /// Scheme used for requests and redirect resolution
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}
