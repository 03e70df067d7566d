//! Transport seam between the fetch client and the network
//!
//! A [`Connector`] opens a [`Transport`] to one endpoint; the transport
//! performs raw GET requests without any status, redirect or retry
//! handling. [`HttpConnector`] is the production implementation on top of
//! reqwest.

use crate::config::ConnectionConfig;
use crate::{ConnectionError, TransportError};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, tls, Client, Proxy};
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;

/// Host and optional port of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The port actually dialed for the given scheme
    pub fn effective_port(&self, scheme: &str) -> u16 {
        self.port
            .unwrap_or(if scheme == "https" { 443 } else { 80 })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// A raw HTTP response, before any status or redirect handling
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns a header value as a string, if present and valid
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An open connection able to issue GET requests
#[async_trait]
pub trait Transport: Send {
    /// Sends a GET for a host-relative target with the given headers
    async fn get(&mut self, target: &str, headers: &HeaderMap)
        -> Result<RawResponse, TransportError>;
}

/// Opens transports to endpoints
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    /// Establishes a new connection to the endpoint
    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport, ConnectionError>;
}

/// Connector backed by a reqwest client per connection
///
/// Each connection gets its own client with a single-slot pool, so
/// replacing the transport tears the old connection down.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    config: ConnectionConfig,
}

impl HttpConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    type Transport = HttpTransport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<HttpTransport, ConnectionError> {
        let fail = |source: TransportError| match &self.config.proxy {
            Some(proxy) => ConnectionError::Proxy {
                proxy: proxy.clone(),
                host: endpoint.to_string(),
                source,
            },
            None => ConnectionError::Connect {
                host: endpoint.to_string(),
                source,
            },
        };

        let client = build_http_client(&self.config).map_err(|e| fail(e.into()))?;
        let port = endpoint.effective_port(self.config.scheme());

        // The first hop must answer before the connection counts as open
        let reachable = match &self.config.proxy {
            Some(proxy) => dial(proxy, self.config.timeout_secs).await,
            None => dial(&format!("{}:{}", endpoint.host, port), self.config.timeout_secs).await,
        };
        reachable.map_err(|e| fail(e.into()))?;

        let base = format!("{}://{}:{}", self.config.scheme(), endpoint.host, port);

        Ok(HttpTransport { client, base })
    }
}

/// Opens and drops a TCP connection to `address` within the timeout
async fn dial(address: &str, timeout_secs: u64) -> std::io::Result<()> {
    tracing::trace!("Dialing {}", address);
    match tokio::time::timeout(Duration::from_secs(timeout_secs), TcpStream::connect(address)).await
    {
        Ok(stream) => stream.map(drop),
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("timed out connecting to {}", address),
        )),
    }
}

/// Builds an HTTP client for one connection
///
/// Redirects are never followed by the client itself, TLS 1.2 is the
/// floor, and a configured proxy is tunnelled through with CONNECT.
///
/// # Example
///
/// ```no_run
/// use serpline::config::ConnectionConfig;
/// use serpline::fetcher::build_http_client;
///
/// let client = build_http_client(&ConnectionConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ConnectionConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let mut builder = Client::builder()
        .use_rustls_tls()
        .min_tls_version(tls::Version::TLS_1_2)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none()) // Handle redirects manually
        .pool_max_idle_per_host(1)
        .tcp_nodelay(true)
        .gzip(true);

    builder = match &config.proxy {
        Some(proxy) => {
            tracing::debug!("Connecting through proxy server {}", proxy);
            builder.proxy(Proxy::all(format!("http://{}", proxy))?)
        }
        None => builder.no_proxy(),
    };

    builder.build()
}

/// A reqwest-backed connection to one endpoint
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base: String,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &mut self,
        target: &str,
        headers: &HeaderMap,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(format!("{}{}", self.base, target))
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&ConnectionConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let config = ConnectionConfig {
            proxy: Some("localhost:8118".to_string()),
            ..Default::default()
        };
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_endpoint_display_and_port() {
        let endpoint = Endpoint::new("www.google.com", None);
        assert_eq!(endpoint.to_string(), "www.google.com");
        assert_eq!(endpoint.effective_port("https"), 443);
        assert_eq!(endpoint.effective_port("http"), 80);

        let endpoint = Endpoint::new("127.0.0.1", Some(8080));
        assert_eq!(endpoint.to_string(), "127.0.0.1:8080");
        assert_eq!(endpoint.effective_port("https"), 8080);
    }

    /// A local port with nothing listening on it
    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_http_connector_builds_base() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ConnectionConfig {
            secure: false,
            ..Default::default()
        };
        let connector = HttpConnector::new(config);
        let transport = connector
            .connect(&Endpoint::new("127.0.0.1", Some(port)))
            .await
            .unwrap();
        assert_eq!(transport.base, format!("http://127.0.0.1:{}", port));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_at_connect() {
        let port = closed_port().await;
        let connector = HttpConnector::new(ConnectionConfig {
            secure: false,
            ..Default::default()
        });

        let err = connector
            .connect(&Endpoint::new("127.0.0.1", Some(port)))
            .await
            .unwrap_err();

        match err {
            ConnectionError::Connect { host, source } => {
                assert_eq!(host, format!("127.0.0.1:{}", port));
                assert!(source.is_connect());
            }
            other => panic!("expected connect error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_proxy_fails_at_connect() {
        let port = closed_port().await;
        let connector = HttpConnector::new(ConnectionConfig {
            proxy: Some(format!("127.0.0.1:{}", port)),
            ..Default::default()
        });

        let err = connector
            .connect(&Endpoint::new("www.google.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::Proxy { .. }));
    }
}
