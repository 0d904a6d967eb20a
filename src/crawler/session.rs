//! Crawl session: the outward-facing `scrape` operation
//!
//! A session owns its page source, dedup set and metrics. Nothing is shared
//! between sessions; construct one per request.

use crate::config::{Config, CrawlConfig};
use crate::crawler::fetcher::{HttpFetcher, PageSource};
use crate::crawler::pagination::PaginationController;
use crate::extract::Extractor;
use crate::output::format_summary;
use crate::record::{BusinessRecord, SearchQuery};
use crate::state::{CrawlMetrics, DedupSet};
use crate::{FetchError, HarvestError};
use thiserror::Error;
use url::Url;

/// Expected negative outcomes of a scrape, returned as values
#[derive(Debug, Error)]
pub enum SessionFailure {
    #[error("No businesses found for '{subject}' in '{location}'")]
    NoResults { subject: String, location: String },

    #[error("The first results page could not be fetched: {source}")]
    FirstPageUnavailable { source: FetchError },
}

/// Outcome of a successful scrape
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub records: Vec<BusinessRecord>,
    pub summary: String,
    pub metrics: CrawlMetrics,
}

/// One crawl session over a directory site
pub struct CrawlSession<S: PageSource> {
    source: S,
    extractor: Extractor,
    crawl: CrawlConfig,
    base_url: Url,
    dedup: DedupSet,
    metrics: CrawlMetrics,
}

impl CrawlSession<HttpFetcher> {
    /// Creates a session fetching over HTTP with a fresh [`HttpFetcher`]
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Self::new(HttpFetcher::from_config(config)?, config)
    }
}

impl<S: PageSource> CrawlSession<S> {
    /// Creates a session around an existing page source
    ///
    /// # Arguments
    ///
    /// * `source` - The page source; owned exclusively by this session
    /// * `config` - Site and crawl settings
    pub fn new(source: S, config: &Config) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.site.base_url)?;
        let extractor = Extractor::new(&base_url, config.crawl.max_directory_email_len)?;

        Ok(Self {
            source,
            extractor,
            crawl: config.crawl.clone(),
            base_url,
            dedup: DedupSet::new(),
            metrics: CrawlMetrics::new(),
        })
    }

    /// Crawls every result page for `query`
    ///
    /// Resets metrics and dedup state first, so a session can serve several
    /// queries one after another.
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeReport)` - Records (possibly empty) plus a summary
    /// * `Err(SessionFailure)` - The first page could not be fetched or held
    ///   no listings
    pub async fn scrape(&mut self, query: &SearchQuery) -> Result<ScrapeReport, SessionFailure> {
        self.metrics = CrawlMetrics::new();
        self.dedup.clear();

        let mut controller = PaginationController::new(
            &mut self.source,
            &self.extractor,
            &self.crawl,
            &self.base_url,
            &mut self.dedup,
            &mut self.metrics,
        );
        let result = controller.run(query).await;

        match result {
            Ok(records) => {
                let summary = format_summary(query, &self.metrics, records.len());
                tracing::info!(
                    "Scrape finished: {} records, {:.1}% success rate in {:.1}s",
                    records.len(),
                    self.metrics.success_rate(),
                    self.metrics.elapsed().as_secs_f64()
                );
                Ok(ScrapeReport {
                    records,
                    summary,
                    metrics: self.metrics.clone(),
                })
            }
            Err(failure) => {
                tracing::warn!("Scrape failed: {}", failure);
                Err(failure)
            }
        }
    }

    /// Metrics of the most recent scrape
    pub fn metrics(&self) -> &CrawlMetrics {
        &self.metrics
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
