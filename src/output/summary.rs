//! Human-readable summary of one scrape
//!
//! The layout mirrors the statistics dump printed at the end of a run.

use crate::record::SearchQuery;
use crate::state::CrawlMetrics;

/// Formats the end-of-run summary
///
/// # Arguments
///
/// * `query` - The query that was scraped
/// * `metrics` - Counters collected during the scrape
/// * `record_count` - Number of records returned
///
/// # Returns
///
/// A multi-line summary ending in a newline
pub fn format_summary(query: &SearchQuery, metrics: &CrawlMetrics, record_count: usize) -> String {
    let subject = if query.subject().is_empty() {
        "(any)"
    } else {
        query.subject()
    };
    let reported = metrics
        .total_reported
        .map(|total| total.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut out = String::from("=== Scrape Summary ===\n\n");

    out.push_str("Query:\n");
    out.push_str(&format!("  What: {}\n", subject));
    out.push_str(&format!("  Where: {}\n\n", query.location()));

    out.push_str("Results:\n");
    out.push_str(&format!("  Records collected: {}\n", record_count));
    out.push_str(&format!("  Reported by directory: {}\n", reported));
    out.push_str(&format!("  Pages fetched: {}\n\n", metrics.pages_fetched));

    out.push_str("Listings:\n");
    out.push_str(&format!("  Processed: {}\n", metrics.total_processed));
    out.push_str(&format!("  Succeeded: {}\n", metrics.succeeded));
    out.push_str(&format!("  Failed: {}\n", metrics.failed));
    out.push_str(&format!(
        "  Success Rate: {:.1}% ({} / {})\n\n",
        metrics.success_rate(),
        metrics.succeeded,
        metrics.total_processed
    ));

    out.push_str("Skipped:\n");
    out.push_str(&format!("  Duplicates: {}\n", metrics.duplicates_skipped));
    out.push_str(&format!(
        "  Outside requested county: {}\n",
        metrics.out_of_area_skipped
    ));
    out.push_str(&format!("  Detail page failures: {}\n", metrics.detail_failures));
    out.push_str(&format!(
        "  Duplicate websites cleared: {}\n\n",
        metrics.websites_cleared
    ));

    out.push_str(&format!(
        "Started: {}\n",
        metrics.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Elapsed: {:.1}s\n", metrics.elapsed().as_secs_f64()));

    out
}
