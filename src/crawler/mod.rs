//! Crawler module for directory page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with pacing, retry logic and proxy rotation
//! - Minimum-interval rate limiting
//! - Pagination over one result set
//! - The crawl session that owns all per-request state

mod fetcher;
mod pagination;
mod rate_limiter;
mod session;

pub use fetcher::{build_http_client, FetchedPage, HttpFetcher, PageSource};
pub use pagination::{search_path, search_url, PaginationController};
pub use rate_limiter::RateLimiter;
pub use session::{CrawlSession, ScrapeReport, SessionFailure};

use crate::config::Config;
use crate::record::SearchQuery;
use crate::HarvestError;

/// Runs one complete scrape over HTTP
///
/// This is the main entry point for a single request. It will:
/// 1. Build a fresh HTTP fetcher and session for this query
/// 2. Walk every result page
/// 3. Return the records and summary, or the reason nothing was found
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `query` - What to search for and where
///
/// # Returns
///
/// * `Ok(Ok(report))` - Scrape completed
/// * `Ok(Err(failure))` - Scrape ended with an expected negative outcome
/// * `Err(HarvestError)` - The session could not be constructed
pub async fn scrape(
    config: &Config,
    query: &SearchQuery,
) -> Result<Result<ScrapeReport, SessionFailure>, HarvestError> {
    let mut session = CrawlSession::from_config(config)?;
    Ok(session.scrape(query).await)
}
