//! Integration tests for the retrieval pipeline
//!
//! These tests use wiremock to stand in for the search backend and run
//! the full fetch, decode and parse cycle over real HTTP connections.

use flate2::write::GzEncoder;
use flate2::Compression;
use serpline::config::ConnectionConfig;
use serpline::fetcher::BROWSER_USER_AGENT;
use serpline::{
    ConnectionError, FetchClient, QueryOptions, RetrievalSession, SearchError, SearchQuery,
};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>rust - Search</title><script>var g = '<div class="g">';</script></head>
<body>
<div id="ires">
  <div class="g">
    <h3 class="r"><a href="/url?q=http%3A%2F%2Fexample.com%2Fx&amp;sa=U&amp;ved=0">Example</a></h3>
    <div class="s"><cite>example.com/x</cite><span class="st">An example site.</span></div>
  </div>
  <div class="related-question-pair">
    <div class="g"><h3 class="r"><a href="http://question.example/">Question</a></h3></div>
  </div>
  <div class="g">
    <h3 class="r"><a href="https://www.rust-lang.org/">Rust Programming Language</a></h3>
    <div class="s"><span class="st">A language empowering everyone.</span></div>
    <table><tr>
      <td><h3 class="r"><a href="https://www.rust-lang.org/learn">Learn</a></h3><div class="st">Get started.</div></td>
      <td><h3 class="r"><a href="https://www.rust-lang.org/tools/install">Install</a></h3></td>
    </tr></table>
  </div>
</div>
<p id="ofr"><em>In order to show you the most relevant results, we have omitted some entries.</em></p>
</body></html>"#;

/// Connection settings for a plain-HTTP mock server
fn test_connection(server: &MockServer) -> ConnectionConfig {
    ConnectionConfig {
        timeout_secs: 5,
        secure: false,
        port: Some(server.address().port()),
        ..Default::default()
    }
}

fn keywords(words: &[&str]) -> QueryOptions {
    QueryOptions {
        keywords: Some(words.iter().map(|w| w.to_string()).collect()),
        ..Default::default()
    }
}

async fn open_session(server: &MockServer, connection: &ConnectionConfig) -> RetrievalSession {
    let query = SearchQuery::new(&keywords(&["rust"]));
    let client = FetchClient::connect_to("127.0.0.1", connection)
        .await
        .expect("Failed to connect to mock server");
    RetrievalSession::with_client(query, client, connection.user_agent)
}

#[tokio::test]
async fn test_fetch_and_parse_results_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("ie", "UTF-8"))
        .and(query_param("num", "10"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    session.fetch().await.expect("Fetch failed");

    let results = session.results();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].index, "1");
    assert_eq!(results[0].title, "Example");
    assert_eq!(results[0].url, "http://example.com/x");
    assert_eq!(results[0].abstract_text, "An example site.");
    assert!(results[0].sitelinks.is_empty());

    assert_eq!(results[1].index, "2");
    assert_eq!(results[1].sitelinks.len(), 2);
    assert_eq!(results[1].sitelinks[0].index, "2a");
    assert_eq!(results[1].sitelinks[0].abstract_text, "Get started.");
    assert_eq!(
        session.url_for("2b"),
        Some("https://www.rust-lang.org/tools/install")
    );

    assert!(session.filtered());
    assert_eq!(session.suggested_spelling(), None);
}

#[tokio::test]
async fn test_sends_browser_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", BROWSER_USER_AGENT))
        .and(header("dnt", "1"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    session.fetch().await.expect("Fetch failed");
    assert_eq!(session.results().len(), 2);
}

#[tokio::test]
async fn test_blocked_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/sorry/index?continue=https://www.google.com/search"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    let err = session.fetch().await.expect_err("Fetch should be blocked");

    assert!(err.is_blocked());
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn test_follows_redirect_on_same_host() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/results?q=rust"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/results"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    session.fetch().await.expect("Fetch failed");
    assert_eq!(session.results().len(), 2);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/search?again=1"))
        .expect(4)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    let err = session.fetch().await.expect_err("Redirect loop should fail");

    assert!(matches!(
        err,
        SearchError::Connection(ConnectionError::Status { status: 302, .. })
    ));
}

#[tokio::test]
async fn test_error_status_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    let err = session.fetch().await.expect_err("503 should fail");

    assert!(matches!(
        err,
        SearchError::Connection(ConnectionError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_cookie_is_replayed() {
    let server = MockServer::start().await;

    // Matches only once the cookie is sent back
    Mock::given(method("GET"))
        .and(header("cookie", "NID=204=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "NID=204=abc; expires=Sat, 01-Jan-2050 00:00:00 GMT; path=/")
                .set_body_string("<html></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    session.fetch().await.expect("First fetch failed");
    assert!(session.results().is_empty());
    assert_eq!(session.client().cookie(), "NID=204=abc");

    session.next_page().await.expect("Second fetch failed");
    assert_eq!(session.results().len(), 2);
}

#[tokio::test]
async fn test_gzip_body_without_content_encoding() {
    let server = MockServer::start().await;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(RESULTS_PAGE.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(compressed))
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    session.fetch().await.expect("Fetch failed");
    assert_eq!(session.results().len(), 2);
}

#[tokio::test]
async fn test_reconnects_after_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>too late</html>")
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .mount(&server)
        .await;

    let connection = ConnectionConfig {
        timeout_secs: 1,
        ..test_connection(&server)
    };
    let mut session = open_session(&server, &connection).await;
    session.fetch().await.expect("Fetch should succeed after reconnecting");

    assert_eq!(session.results().len(), 2);
    assert_eq!(session.client().reconnects(), 1);
}

#[tokio::test]
async fn test_plain_layout_without_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="g"><h3 class="r"><a href="/url?q=http://plain.example/&amp;sa=U">Plain</a></h3><span class="st">Inline <b>summary</b> text</span></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let connection = ConnectionConfig {
        user_agent: false,
        ..test_connection(&server)
    };
    let mut session = open_session(&server, &connection).await;
    session.fetch().await.expect("Fetch failed");

    let results = session.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "http://plain.example/");
    assert_eq!(results[0].abstract_text, "Inline summary text");
}

#[tokio::test]
async fn test_unreachable_host_fails_at_connect() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let connection = ConnectionConfig {
        timeout_secs: 2,
        secure: false,
        port: Some(port),
        ..Default::default()
    };
    let err = FetchClient::connect_to("127.0.0.1", &connection)
        .await
        .err()
        .expect("connect should fail");

    assert!(matches!(
        err,
        SearchError::Connection(ConnectionError::Connect { .. })
    ));
}

#[tokio::test]
async fn test_non_ascii_page() {
    let server = MockServer::start().await;

    let page = r#"<html><body>
<div class="g"><h3 class="r"><a href="http://a.example/">élan vital</a></h3><div class="s"><span class="st">«Bergson» … 創造的進化</span></div></div>
</body></html>"#;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(page),
        )
        .mount(&server)
        .await;

    let mut session = open_session(&server, &test_connection(&server)).await;
    session.fetch().await.expect("Fetch failed");

    let results = session.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "élan vital");
    assert_eq!(results[0].abstract_text, "«Bergson» … 創造的進化");
}
