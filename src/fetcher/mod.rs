//! Fetch layer
//!
//! This module contains everything between a request target and the page
//! text, including:
//! - A persistent connection per host, optionally tunnelled through a proxy
//! - One reconnect-and-retry on transport failure
//! - Bounded redirect following with blocked-page detection
//! - Cookie capture and replay
//! - Gzip and UTF-8 decoding

mod client;
mod decode;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{is_blocked_location, FetchClient};
pub use decode::decode_body;
pub use transport::{
    build_http_client, Connector, Endpoint, HttpConnector, HttpTransport, RawResponse, Transport,
};

/// Browser-like User-Agent sent unless disabled
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:52.0) Gecko/20100101 Firefox/52.0";

/// Maximum number of redirects followed per fetch
pub const MAX_REDIRECTS: usize = 3;

/// Redirect targets signalling that the backend is blocking the client
pub const BLOCKED_PATTERNS: &[&str] = &["sorry/IndexRedirect?", "sorry/index?"];
