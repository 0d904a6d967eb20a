//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the directory and run complete
//! scrapes end-to-end over HTTP.

use directory_harvester::config::{Config, CountyFilter};
use directory_harvester::crawler::{CrawlSession, SessionFailure};
use directory_harvester::output::write_records_csv;
use directory_harvester::SearchQuery;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_1: &str = "/q/business/advanced/where/Cork/what/plumbers/1";
const PAGE_2: &str = "/q/business/advanced/where/Cork/what/plumbers/2";

/// Creates a test configuration pointed at the mock server with no waiting
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.fetch.min_interval_ms = 0;
    config.fetch.interval_jitter_ms = 0;
    config.fetch.max_attempts = 2;
    config.fetch.timeout_secs = 5;
    config.fetch.connect_timeout_secs = 5;
    config.fetch.rate_limit_backoff_secs = 0;
    config.fetch.error_backoff_secs = 0;
    config.crawl.page_delay_min_ms = 0;
    config.crawl.page_delay_max_ms = 0;
    config.crawl.enrich_details = false;
    config
}

/// Renders one listing card
fn listing(name: &str, slug: &str, address: &str, phone: &str, website: Option<&str>) -> String {
    let links = website
        .map(|w| {
            format!(
                r#"<div class="listing_links"><a class="website" href="{}">Website</a></div>"#,
                w
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="listing_container">
             <h3 class="listing_title"><a class="listing_title_link" href="/business/{}">{}</a></h3>
             <div class="listing_address">{}</div>
             <a class="link_listing_number" href="tel:{}">Call</a>
             {}
           </div>"#,
        slug, name, address, phone, links
    )
}

fn results_page(cards: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<a class="next_page" href="{}">Next</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body>
             <div class="result_count">Showing {} results</div>
             {}
             {}
           </body></html>"#,
        cards.len(),
        cards.join("\n"),
        next
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_across_two_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        PAGE_1,
        results_page(
            &[
                listing(
                    "Murphy Plumbing",
                    "murphy",
                    "Main St, Bandon, Co. Cork",
                    "021 123 4567",
                    Some("https://murphyplumbing.ie"),
                ),
                listing(
                    "Kelly Heating",
                    "kelly",
                    "Mallow, Co. Cork",
                    "022 765 4321",
                    None,
                ),
            ],
            Some(PAGE_2),
        ),
    )
    .await;

    mount_page(
        &mock_server,
        PAGE_2,
        results_page(
            &[listing(
                "Walsh & Sons",
                "walsh",
                "Cobh, Co. Cork",
                "021 999 0000",
                None,
            )],
            None,
        ),
    )
    .await;

    let config = create_test_config(&base_url);
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let report = session.scrape(&query).await.unwrap();

    let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Murphy Plumbing", "Kelly Heating", "Walsh & Sons"]);

    let murphy = &report.records[0];
    assert_eq!(murphy.county.as_deref(), Some("Cork"));
    assert_eq!(murphy.phone.as_deref(), Some("021 123 4567"));
    assert_eq!(murphy.website.as_deref(), Some("https://murphyplumbing.ie"));
    assert_eq!(
        murphy.detail_url.as_deref(),
        Some(format!("{}/business/murphy", base_url).as_str())
    );

    assert_eq!(report.metrics.pages_fetched, 2);
    assert_eq!(report.metrics.total_reported, Some(2));
    assert_eq!(
        report.metrics.succeeded + report.metrics.failed,
        report.metrics.total_processed
    );
    assert!(report.summary.contains("Success Rate: 100.0% (3 / 3)"));
}

#[tokio::test]
async fn test_detail_pages_fill_contact_gaps() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        PAGE_1,
        results_page(
            &[listing(
                "Murphy Plumbing",
                "murphy",
                "Bandon, Co. Cork",
                "021 123 4567",
                None,
            )],
            None,
        ),
    )
    .await;

    mount_page(
        &mock_server,
        "/business/murphy",
        r#"<html><body>
             <h1>Murphy Plumbing</h1>
             <div class="contact_info">
               <a href="tel:087 111 2222">Mobile</a>
               <a href="mailto:info@murphyplumbing.ie">Email us</a>
             </div>
           </body></html>"#
            .to_string(),
    )
    .await;

    let mut config = create_test_config(&base_url);
    config.crawl.enrich_details = true;
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let report = session.scrape(&query).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.phone.as_deref(), Some("021 123 4567"));
    assert_eq!(record.additional_phones, vec!["087 111 2222".to_string()]);
    assert_eq!(record.email.as_deref(), Some("info@murphyplumbing.ie"));
    assert_eq!(report.metrics.detail_failures, 0);
}

#[tokio::test]
async fn test_missing_detail_page_keeps_listing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // No detail page is mounted, so it answers 404
    mount_page(
        &mock_server,
        PAGE_1,
        results_page(
            &[listing(
                "Murphy Plumbing",
                "murphy",
                "Bandon, Co. Cork",
                "021 123 4567",
                None,
            )],
            None,
        ),
    )
    .await;

    let mut config = create_test_config(&base_url);
    config.crawl.enrich_details = true;
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let report = session.scrape(&query).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.metrics.detail_failures, 1);
    assert_eq!(report.metrics.succeeded, 1);
}

#[tokio::test]
async fn test_empty_first_page_is_no_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, PAGE_1, results_page(&[], None)).await;

    let config = create_test_config(&base_url);
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let failure = session.scrape(&query).await.unwrap_err();

    assert!(matches!(failure, SessionFailure::NoResults { .. }));
    assert_eq!(
        failure.to_string(),
        "No businesses found for 'plumbers' in 'Cork'"
    );
}

#[tokio::test]
async fn test_failing_first_page_is_unavailable() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(PAGE_1))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url);
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let failure = session.scrape(&query).await.unwrap_err();

    assert!(matches!(
        failure,
        SessionFailure::FirstPageUnavailable { .. }
    ));
}

#[tokio::test]
async fn test_listings_outside_county_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        PAGE_1,
        results_page(
            &[
                listing("Cork Plumbing", "cork", "Bandon, Co. Cork", "021 123 4567", None),
                listing("Kerry Plumbing", "kerry", "Tralee, Co. Kerry", "066 123 4567", None),
            ],
            None,
        ),
    )
    .await;

    let config = create_test_config(&base_url);
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let mut session = CrawlSession::from_config(&config).unwrap();
    let report = session.scrape(&query).await.unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].name, "Cork Plumbing");
    assert_eq!(report.metrics.out_of_area_skipped, 1);

    let mut unfiltered = config.clone();
    unfiltered.crawl.county_filter = CountyFilter::Off;
    let mut session = CrawlSession::from_config(&unfiltered).unwrap();
    let report = session.scrape(&query).await.unwrap();
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_duplicates_and_shared_websites() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let shared = Some("https://sharedsite.ie");
    let cards = vec![
        listing("Murphy Plumbing", "murphy", "Bandon, Co. Cork", "021 123 4567", shared),
        listing("Murphy Heating", "murphy-heating", "Bandon, Co. Cork", "021 123 4568", shared),
    ];

    // Page 2 repeats the first card
    mount_page(&mock_server, PAGE_1, results_page(&cards, Some(PAGE_2))).await;
    mount_page(&mock_server, PAGE_2, results_page(&cards[..1], None)).await;

    let config = create_test_config(&base_url);
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let report = session.scrape(&query).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(
        report.records[0].website.as_deref(),
        Some("https://sharedsite.ie")
    );
    assert_eq!(report.records[1].website, None);
    assert_eq!(report.metrics.duplicates_skipped, 1);
    assert_eq!(report.metrics.websites_cleared, 1);
}

#[tokio::test]
async fn test_unviable_listing_counts_as_failed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        PAGE_1,
        results_page(
            &[
                listing("Murphy Plumbing", "murphy", "Bandon, Co. Cork", "021 123 4567", None),
                listing("Nowhere Ltd", "nowhere", "", "021 000 0000", None),
            ],
            None,
        ),
    )
    .await;

    let mut config = create_test_config(&base_url);
    config.crawl.county_filter = CountyFilter::Off;
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();

    let report = session.scrape(&query).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.metrics.total_processed, 2);
    assert_eq!(report.metrics.failed, 1);
    assert!(report.summary.contains("Success Rate: 50.0% (1 / 2)"));
}

#[tokio::test]
async fn test_scrape_then_write_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        PAGE_1,
        results_page(
            &[listing(
                "Murphy Plumbing",
                "murphy",
                "Bandon, Co. Cork",
                "021 123 4567",
                Some("https://murphyplumbing.ie"),
            )],
            None,
        ),
    )
    .await;

    let config = create_test_config(&base_url);
    let mut session = CrawlSession::from_config(&config).unwrap();
    let query = SearchQuery::new("plumbers", "Cork").unwrap();
    let report = session.scrape(&query).await.unwrap();

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("out.csv");
    write_records_csv(&report.records, &csv_path).unwrap();

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Phone,Website,Location,County,Detail URL")
    );
    assert!(lines
        .next()
        .unwrap()
        .starts_with("Murphy Plumbing,021 123 4567,https://murphyplumbing.ie,"));
}
