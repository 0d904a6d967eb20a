//! Integration tests for the HTTP page source
//!
//! These tests use wiremock to stand in for the directory and exercise the
//! retry and backoff policy of the fetcher.

use directory_harvester::config::Config;
use directory_harvester::crawler::{HttpFetcher, PageSource};
use directory_harvester::FetchError;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration pointed at the mock server with no waiting
fn create_test_config(base_url: &str, max_attempts: u32) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.fetch.user_agent = "HarvesterTest/1.0".to_string();
    config.fetch.min_interval_ms = 0;
    config.fetch.interval_jitter_ms = 0;
    config.fetch.max_attempts = max_attempts;
    config.fetch.timeout_secs = 5;
    config.fetch.connect_timeout_secs = 5;
    config.fetch.rate_limit_backoff_secs = 0;
    config.fetch.error_backoff_secs = 0;
    config
}

#[tokio::test]
async fn test_fetch_success_sends_browser_headers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "HarvesterTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 3);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let page = fetcher.fetch(&format!("{}/page", base_url)).await.unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html>ok</html>");
    assert_eq!(fetcher.request_count(), 1);
}

#[tokio::test]
async fn test_fetch_sends_referer_for_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("referer", format!("{}/", base_url).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("referred"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 1);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let page = fetcher.fetch(&format!("{}/page", base_url)).await.unwrap();
    assert_eq!(page.body, "referred");
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // First request is throttled, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 3);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let page = fetcher.fetch(&format!("{}/busy", base_url)).await.unwrap();

    assert_eq!(page.body, "finally");
    assert_eq!(fetcher.request_count(), 2);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 3);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let page = fetcher.fetch(&format!("{}/flaky", base_url)).await.unwrap();

    assert_eq!(page.body, "recovered");
    assert_eq!(fetcher.request_count(), 3);
}

#[tokio::test]
async fn test_forbidden_exhausts_attempts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 3);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let err = fetcher
        .fetch(&format!("{}/blocked", base_url))
        .await
        .unwrap_err();

    match &err {
        FetchError::Exhausted { attempts, last, .. } => {
            assert_eq!(*attempts, 3);
            assert!(matches!(**last, FetchError::Forbidden { .. }));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert!(matches!(err.root_cause(), FetchError::Forbidden { .. }));
}

#[tokio::test]
async fn test_not_found_reports_status() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 2);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let err = fetcher
        .fetch(&format!("{}/missing", base_url))
        .await
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        FetchError::HttpError { status: 404, .. }
    ));
    assert_eq!(fetcher.request_count(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1
    let closed = "http://127.0.0.1:1".to_string();

    let config = create_test_config(&closed, 2);
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let err = fetcher.fetch(&format!("{}/", closed)).await.unwrap_err();

    assert!(err.root_cause().is_network());
}

#[tokio::test]
async fn test_forbidden_rotates_to_next_proxy() {
    let blocked_proxy = MockServer::start().await;
    let open_proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&blocked_proxy)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via-second"))
        .expect(1)
        .mount(&open_proxy)
        .await;

    let mut config = create_test_config("http://directory.test", 2);
    config.fetch.proxies = vec![blocked_proxy.uri(), open_proxy.uri()];
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let page = fetcher.fetch("http://directory.test/page").await.unwrap();

    assert_eq!(page.body, "via-second");
    assert_eq!(fetcher.active_client(), 1);
}

#[tokio::test]
async fn test_network_failure_rotates_to_next_proxy() {
    let open_proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via-second"))
        .mount(&open_proxy)
        .await;

    // Nothing listens on port 1
    let mut config = create_test_config("http://directory.test", 2);
    config.fetch.proxies = vec!["http://127.0.0.1:1".to_string(), open_proxy.uri()];
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let page = fetcher.fetch("http://directory.test/page").await.unwrap();

    assert_eq!(page.body, "via-second");
    assert_eq!(fetcher.active_client(), 1);
}

#[tokio::test]
async fn test_rate_limited_waits_for_backoff() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 2);
    config.fetch.rate_limit_backoff_secs = 1;
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    let start = Instant::now();
    let page = fetcher.fetch(&format!("{}/busy", base_url)).await.unwrap();

    assert_eq!(page.body, "finally");
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_server_error_backoff_grows_per_attempt() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, 3);
    config.fetch.error_backoff_secs = 1;
    let mut fetcher = HttpFetcher::from_config(&config).unwrap();

    // 1s after the first attempt, 2s after the second
    let start = Instant::now();
    let page = fetcher.fetch(&format!("{}/flaky", base_url)).await.unwrap();

    assert_eq!(page.body, "recovered");
    assert!(start.elapsed() >= Duration::from_secs(3));
}
