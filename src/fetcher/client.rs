//! Persistent-connection fetch client
//!
//! # Request Flow
//!
//! 1. Make sure a connection is open (connect if none is)
//! 2. Send GET; on a transport failure reconnect once and resend once
//! 3. Follow up to [`MAX_REDIRECTS`] redirects
//!    - Fail with `Blocked` if the target is a "sorry" page
//!    - Reconnect when the target is on another host
//! 4. Anything but HTTP 200 at the end is a `ConnectionError::Status`
//! 5. Gunzip (if needed) and decode as UTF-8

use crate::config::ConnectionConfig;
use crate::fetcher::decode::decode_body;
use crate::fetcher::transport::{Connector, Endpoint, HttpConnector, RawResponse, Transport};
use crate::fetcher::{BLOCKED_PATTERNS, BROWSER_USER_AGENT, MAX_REDIRECTS};
use crate::{ConnectionError, Result, SearchError, TransportError};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONNECTION, COOKIE, SET_COOKIE,
    USER_AGENT,
};
use url::{Position, Url};

/// Redirect status codes that are followed
const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Fetches pages from one host over a persistent connection
pub struct FetchClient<C: Connector = HttpConnector> {
    connector: C,
    endpoint: Endpoint,
    scheme: &'static str,
    user_agent: bool,
    transport: Option<C::Transport>,
    cookie: String,
    reconnects: u32,
}

impl FetchClient<HttpConnector> {
    /// Connects to a host using the production connector
    ///
    /// # Example
    ///
    /// ```no_run
    /// use serpline::config::ConnectionConfig;
    /// use serpline::FetchClient;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> serpline::Result<()> {
    /// let mut client = FetchClient::connect_to("www.google.com", &ConnectionConfig::default()).await?;
    /// let page = client.fetch("/search?q=rust").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect_to(host: &str, config: &ConnectionConfig) -> Result<Self> {
        let connector = HttpConnector::new(config.clone());
        let endpoint = Endpoint::new(host, config.port);
        let mut client = Self::with_connector(connector, endpoint, config);
        client.ensure_connected().await?;
        Ok(client)
    }
}

impl<C: Connector> FetchClient<C> {
    /// Creates a client without opening a connection yet
    pub fn with_connector(connector: C, endpoint: Endpoint, config: &ConnectionConfig) -> Self {
        Self {
            connector,
            endpoint,
            scheme: config.scheme(),
            user_agent: config.user_agent,
            transport: None,
            cookie: String::new(),
            reconnects: 0,
        }
    }

    /// The endpoint currently connected to (or to be connected to)
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    /// The cookie sent with every request, empty until one is captured
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Number of reconnections made after transport failures
    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Closes the current connection (if any) and connects to `endpoint`
    pub async fn connect(&mut self, endpoint: Endpoint) -> Result<()> {
        self.close();
        tracing::debug!("Connecting to new host {}", endpoint);
        let transport = self.connector.connect(&endpoint).await?;
        self.endpoint = endpoint;
        self.transport = Some(transport);
        Ok(())
    }

    /// Tears down and re-establishes the connection to the current endpoint
    pub async fn reconnect(&mut self) -> Result<()> {
        self.reconnects += 1;
        self.connect(self.endpoint.clone()).await
    }

    /// Closes the connection; the next fetch reconnects
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            tracing::debug!("Closed connection to {}", self.endpoint);
        }
    }

    /// Fetches a host-relative target and returns the decoded page
    ///
    /// Allows one reconnection and up to [`MAX_REDIRECTS`] redirects.
    ///
    /// # Errors
    ///
    /// * `SearchError::Blocked` - redirected to the unusual-activity page
    /// * `SearchError::Connection` - any other unrecoverable failure
    pub async fn fetch(&mut self, target: &str) -> Result<String> {
        self.ensure_connected().await?;

        let mut response = match self.raw_get(target).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Got transport error: {}", e);
                tracing::debug!("Attempting to reconnect...");
                self.reconnect().await?;
                match self.raw_get(target).await {
                    Ok(response) => response,
                    Err(source) => return Err(self.request_error(target, source).into()),
                }
            }
        };

        let mut redirects = 0;
        while response.status != 200 && redirects < MAX_REDIRECTS {
            if !REDIRECT_STATUSES.contains(&response.status) {
                break;
            }

            let location = response.header("location").unwrap_or("").to_string();
            if is_blocked_location(&location) {
                tracing::warn!("Redirected to {}, query is being blocked", location);
                return Err(SearchError::Blocked { location });
            }

            response = self.redirect(&location).await?;
            redirects += 1;
        }

        if response.status != 200 {
            return Err(ConnectionError::Status {
                status: response.status,
                reason: response.reason,
            }
            .into());
        }

        Ok(decode_body(&response.body)?)
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.transport.is_none() {
            self.connect(self.endpoint.clone()).await?;
        }
        Ok(())
    }

    /// Follows one redirect, switching hosts when the target requires it
    async fn redirect(&mut self, location: &str) -> Result<RawResponse> {
        tracing::debug!("Redirecting to URL {}", location);

        let invalid = || ConnectionError::InvalidRedirect {
            location: location.to_string(),
        };

        let base = Url::parse(&format!(
            "{}://{}:{}/",
            self.scheme,
            self.endpoint.host,
            self.endpoint.effective_port(self.scheme)
        ))
        .map_err(|_| invalid())?;
        let url = base.join(location).map_err(|_| invalid())?;
        let host = url.host_str().ok_or_else(invalid)?;

        let same_endpoint = host == self.endpoint.host
            && url.port_or_known_default() == Some(self.endpoint.effective_port(self.scheme));
        if !same_endpoint {
            self.connect(Endpoint::new(host, url.port())).await?;
        }

        let target = &url[Position::BeforePath..Position::AfterQuery];
        match self.raw_get(target).await {
            Ok(response) => Ok(response),
            Err(source) => Err(self.request_error(location, source).into()),
        }
    }

    /// Classifies a failed request: unreachable peers are connection failures
    fn request_error(&self, target: &str, source: TransportError) -> ConnectionError {
        if source.is_connect() {
            ConnectionError::Connect {
                host: self.endpoint.to_string(),
                source,
            }
        } else {
            ConnectionError::Request {
                target: target.to_string(),
                source,
            }
        }
    }

    /// Sends one GET without status handling and captures the first cookie
    async fn raw_get(&mut self, target: &str) -> std::result::Result<RawResponse, TransportError> {
        tracing::debug!("Fetching URL {}", target);
        let headers = self.request_headers();

        let transport = self.transport.as_mut().ok_or_else(|| {
            TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "no open connection",
            ))
        })?;
        let response = transport.get(target, &headers).await?;

        if self.cookie.is_empty() {
            // No cookie is handed out once the client is already blocked
            if let Some(complete) = response.header(SET_COOKIE.as_str()) {
                self.cookie = complete.split(';').next().unwrap_or("").to_string();
                tracing::debug!("Cookie: {}", self.cookie);
            }
        }

        Ok(response)
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(if self.user_agent {
                BROWSER_USER_AGENT
            } else {
                ""
            }),
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&self.cookie).unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
        headers
    }
}

/// Whether a redirect target is the backend's unusual-activity page
pub fn is_blocked_location(location: &str) -> bool {
    BLOCKED_PATTERNS
        .iter()
        .any(|pattern| location.contains(pattern))
}
