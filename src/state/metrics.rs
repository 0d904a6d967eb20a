use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Progress counters for one crawl session
///
/// `total_processed` counts listings that entered processing, i.e. after
/// dedup and area filtering. Every processed listing ends as exactly one of
/// `succeeded` or `failed`.
#[derive(Debug, Clone)]
pub struct CrawlMetrics {
    /// Listings that reached validation
    pub total_processed: u64,

    /// Listings retained as records
    pub succeeded: u64,

    /// Listings rejected by the viability rule
    pub failed: u64,

    /// Result pages fetched successfully
    pub pages_fetched: u64,

    /// Listings skipped because their detail URL or name key was already seen
    pub duplicates_skipped: u64,

    /// Listings skipped because their county did not match the requested one
    pub out_of_area_skipped: u64,

    /// Detail-page fetches that failed (the listing was still processed)
    pub detail_failures: u64,

    /// Records whose website was cleared as a duplicate
    pub websites_cleared: u64,

    /// Total result count reported by the directory, when it could be read
    pub total_reported: Option<u64>,

    /// Wall-clock start of the session
    pub started_at: DateTime<Utc>,

    start: Instant,
}

impl CrawlMetrics {
    pub fn new() -> Self {
        Self {
            total_processed: 0,
            succeeded: 0,
            failed: 0,
            pages_fetched: 0,
            duplicates_skipped: 0,
            out_of_area_skipped: 0,
            detail_failures: 0,
            websites_cleared: 0,
            total_reported: None,
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    /// Records a listing that passed validation
    pub fn record_success(&mut self) {
        self.total_processed += 1;
        self.succeeded += 1;
    }

    /// Records a listing that failed validation
    pub fn record_failure(&mut self) {
        self.total_processed += 1;
        self.failed += 1;
    }

    /// Share of processed listings that were retained, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.total_processed as f64) * 100.0
        }
    }

    /// Time since the session started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for CrawlMetrics {
    fn default() -> Self {
        Self::new()
    }
}
