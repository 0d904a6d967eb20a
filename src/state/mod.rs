//! State module for tracking crawl progress
//!
//! This module provides the session-scoped state of one crawl.
//!
//! # Components
//!
//! - `CrawlPhase`: The pagination controller's state machine
//! - `DedupSet`: Detail URLs, websites and name keys already seen
//! - `CrawlMetrics`: Progress counters and timing

mod crawl_phase;
mod dedup;
mod metrics;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use dedup::DedupSet;
pub use metrics::CrawlMetrics;
