//! Pagination controller for one result set
//!
//! Drives the crawl of a single search: fetch a result page, read its
//! listings, enrich each from its detail page, validate and deduplicate, then
//! follow the next-page control until the result set is exhausted.
//!
//! Processing is strictly sequential. Every fetch goes through the same
//! [`PageSource`], whose rate limiter is the single pacing point.

use crate::config::{CountyFilter, CrawlConfig};
use crate::crawler::fetcher::PageSource;
use crate::crawler::session::SessionFailure;
use crate::extract::Extractor;
use crate::normalize::{canonical_county, collapse_whitespace, extract_county};
use crate::record::{BusinessRecord, ListingStub, SearchQuery};
use crate::state::{CrawlMetrics, CrawlPhase, DedupSet};
use crate::FetchError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Characters left unescaped in a search path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encodes free text as one path segment, spaces becoming `+`
fn encode_segment(text: &str) -> String {
    text.split_whitespace()
        .map(|word| utf8_percent_encode(word, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Builds the search path for `page`
///
/// # Examples
///
/// ```
/// use directory_harvester::crawler::search_path;
/// use directory_harvester::SearchQuery;
///
/// let query = SearchQuery::new("plumbers", "Co. Cork").unwrap();
/// assert_eq!(
///     search_path(&query, 2),
///     "/q/business/advanced/where/Co.+Cork/what/plumbers/2"
/// );
/// ```
pub fn search_path(query: &SearchQuery, page: u32) -> String {
    format!(
        "/q/business/advanced/where/{}/what/{}/{}",
        encode_segment(query.location()),
        encode_segment(query.subject()),
        page
    )
}

/// Builds the absolute search URL for `page` on the directory at `base_url`
pub fn search_url(base_url: &Url, query: &SearchQuery, page: u32) -> Result<Url, url::ParseError> {
    base_url.join(&search_path(query, page))
}

/// The county listings must be in, if any, for this query and filter mode
fn target_county(filter: CountyFilter, location: &str) -> Option<String> {
    match filter {
        CountyFilter::Off => None,
        CountyFilter::WhenCounty => canonical_county(location).map(String::from),
        CountyFilter::Strict => Some(
            canonical_county(location)
                .map(String::from)
                .unwrap_or_else(|| location.trim().to_string()),
        ),
    }
}

/// State machine over one result set
///
/// Borrows the session's source, dedup set and metrics for the duration of
/// one [`run`](PaginationController::run).
pub struct PaginationController<'a, S: PageSource> {
    source: &'a mut S,
    extractor: &'a Extractor,
    crawl: &'a CrawlConfig,
    base_url: &'a Url,
    dedup: &'a mut DedupSet,
    metrics: &'a mut CrawlMetrics,
    phase: CrawlPhase,
}

impl<'a, S: PageSource> PaginationController<'a, S> {
    pub fn new(
        source: &'a mut S,
        extractor: &'a Extractor,
        crawl: &'a CrawlConfig,
        base_url: &'a Url,
        dedup: &'a mut DedupSet,
        metrics: &'a mut CrawlMetrics,
    ) -> Self {
        Self {
            source,
            extractor,
            crawl,
            base_url,
            dedup,
            metrics,
            phase: CrawlPhase::Start,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Walks the result set to exhaustion
    ///
    /// # Returns
    ///
    /// * `Ok(records)` - The crawl reached `Done` (records may be empty)
    /// * `Err(SessionFailure)` - The first page failed or held no listings
    pub async fn run(&mut self, query: &SearchQuery) -> Result<Vec<BusinessRecord>, SessionFailure> {
        let mut records = Vec::new();
        let mut fetched_pages: HashSet<String> = HashSet::new();
        let target = target_county(self.crawl.county_filter, query.location());
        let mut page_num: u32 = 1;

        let mut page_url = search_url(self.base_url, query, page_num).map_err(|e| {
            self.transition(CrawlPhase::FetchingPage);
            self.transition(CrawlPhase::Aborted);
            SessionFailure::FirstPageUnavailable {
                source: FetchError::InvalidUrl {
                    url: search_path(query, page_num),
                    message: e.to_string(),
                },
            }
        })?;

        tracing::info!(
            "Searching '{}' in '{}' starting at {}",
            query.subject(),
            query.location(),
            page_url
        );

        loop {
            self.transition(CrawlPhase::FetchingPage);
            fetched_pages.insert(page_url.to_string());

            let page = match self.source.fetch(page_url.as_str()).await {
                Ok(page) => page,
                Err(err) if page_num == 1 => {
                    tracing::warn!("First results page unavailable: {}", err);
                    self.transition(CrawlPhase::Aborted);
                    return Err(SessionFailure::FirstPageUnavailable { source: err });
                }
                Err(err) => {
                    tracing::warn!("Stopping at page {}: {}", page_num, err);
                    self.transition(CrawlPhase::Done);
                    break;
                }
            };
            self.metrics.pages_fetched += 1;

            self.transition(CrawlPhase::ExtractingListings);
            let resolve_base = Url::parse(&page.final_url).unwrap_or_else(|_| page_url.clone());
            let results = self.extractor.results_page(
                &page.body,
                &resolve_base,
                &search_path(query, page_num + 1),
            );

            if page_num == 1 {
                if results.listings.is_empty() {
                    tracing::info!("No listings on the first results page");
                    self.transition(CrawlPhase::Aborted);
                    return Err(SessionFailure::NoResults {
                        subject: query.subject().to_string(),
                        location: query.location().to_string(),
                    });
                }
                self.metrics.total_reported = results
                    .total_reported
                    .or(Some(results.listings.len() as u64));
            }

            tracing::info!(
                "Page {}: {} listings ({} of ~{} kept so far)",
                page_num,
                results.listings.len(),
                records.len(),
                self.metrics.total_reported.unwrap_or_default()
            );

            for stub in results.listings {
                if let Some(record) = self.process_listing(stub, target.as_deref()).await {
                    records.push(record);
                }
            }

            self.transition(CrawlPhase::DecidingNextPage);

            let Some(next) = results.next_url else {
                tracing::info!("No next page after page {}", page_num);
                self.transition(CrawlPhase::Done);
                break;
            };

            if fetched_pages.contains(&next) {
                tracing::warn!("Next page {} was already fetched; stopping", next);
                self.transition(CrawlPhase::Done);
                break;
            }

            if page_num >= self.crawl.max_pages {
                tracing::warn!("Reached the {}-page ceiling; stopping", self.crawl.max_pages);
                self.transition(CrawlPhase::Done);
                break;
            }

            let next_url = match Url::parse(&next) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Unusable next page URL {}: {}", next, e);
                    self.transition(CrawlPhase::Done);
                    break;
                }
            };

            page_num += 1;
            page_url = next_url;

            let delay = self.page_delay();
            tracing::debug!("Waiting {:?} before page {}", delay, page_num);
            tokio::time::sleep(delay).await;
        }

        tracing::info!(
            "Result set exhausted: {} records from {} pages",
            records.len(),
            self.metrics.pages_fetched
        );

        Ok(records)
    }

    /// Dedups, filters, enriches and validates one listing
    ///
    /// Returns the record when it passes validation. Skipped listings are not
    /// counted as processed; rejected ones are counted as failed.
    async fn process_listing(
        &mut self,
        mut stub: ListingStub,
        target: Option<&str>,
    ) -> Option<BusinessRecord> {
        let fresh = match &stub.detail_url {
            Some(url) => self.dedup.insert_detail_url(url),
            None => self.dedup.insert_name_key(&stub.name, &stub.location_text),
        };
        if !fresh {
            self.metrics.duplicates_skipped += 1;
            tracing::debug!("Skipping duplicate listing '{}'", stub.name);
            return None;
        }

        if let Some(target) = target {
            let county = extract_county(&stub.location_text);
            if !county.is_some_and(|c| c.eq_ignore_ascii_case(target)) {
                self.metrics.out_of_area_skipped += 1;
                tracing::debug!(
                    "Skipping '{}' at '{}': not in {}",
                    stub.name,
                    stub.location_text,
                    target
                );
                return None;
            }
        }

        if self.crawl.enrich_details {
            if let Some(detail_url) = stub.detail_url.clone() {
                self.enrich(&mut stub, &detail_url).await;
            }
        }

        let mut record = build_record(stub);
        if !record.is_viable() {
            self.metrics.record_failure();
            tracing::debug!(
                "Rejected listing '{}' (location '{}', county {:?})",
                record.name,
                record.location,
                record.county
            );
            return None;
        }

        if let Some(website) = record.website.as_deref() {
            if !self.dedup.insert_website(website) {
                tracing::debug!("Clearing duplicate website {} from '{}'", website, record.name);
                record.website = None;
                self.metrics.websites_cleared += 1;
            }
        }

        self.metrics.record_success();
        tracing::debug!("Added business: {}", record.name);
        Some(record)
    }

    /// Fetches a detail page and merges its fields into the stub
    ///
    /// A failed fetch leaves the stub as it was.
    async fn enrich(&mut self, stub: &mut ListingStub, detail_url: &str) {
        self.transition(CrawlPhase::EnrichingDetail);

        match self.source.fetch(detail_url).await {
            Ok(page) => {
                let resolve_base = Url::parse(&page.final_url).or_else(|_| Url::parse(detail_url));
                if let Ok(base) = resolve_base {
                    stub.merge_detail(self.extractor.detail_page(&page.body, &base));
                }
            }
            Err(err) => {
                self.metrics.detail_failures += 1;
                tracing::warn!("Detail page for '{}' unavailable: {}", stub.name, err);
            }
        }
    }

    /// Random delay between result pages
    fn page_delay(&self) -> Duration {
        let min = self.crawl.page_delay_min_ms;
        let max = self.crawl.page_delay_max_ms;
        let ms = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }

    fn transition(&mut self, next: CrawlPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!("Unexpected crawl phase transition {} -> {}", self.phase, next);
            debug_assert!(false, "illegal crawl phase transition {} -> {}", self.phase, next);
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// Turns an enriched stub into a record
///
/// The first phone and email become the primary values; the rest are kept as
/// additional values.
fn build_record(stub: ListingStub) -> BusinessRecord {
    let location = collapse_whitespace(&stub.location_text);
    let county = extract_county(&location).map(String::from);

    let mut phones = stub.phones.into_iter();
    let mut emails = stub.emails.into_iter();

    BusinessRecord {
        name: stub.name,
        location,
        county,
        phone: phones.next(),
        additional_phones: phones.collect(),
        email: emails.next(),
        additional_emails: emails.collect(),
        website: stub.website_hint,
        categories: if stub.categories.is_empty() {
            None
        } else {
            Some(stub.categories.join(", "))
        },
        description: stub.description,
        detail_url: stub.detail_url,
    }
}
