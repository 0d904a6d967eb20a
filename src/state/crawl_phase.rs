/// Crawl phase definitions for one result set
///
/// A crawl walks `Start -> FetchingPage -> ExtractingListings ->
/// (EnrichingDetail)* -> DecidingNextPage -> {FetchingPage | Done}` and can
/// abort from the first page fetch or extraction.
use std::fmt;

/// Represents the current phase of the pagination controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Nothing fetched yet
    Start,

    /// A result page is being fetched
    FetchingPage,

    /// Listing cards are being read off the current page
    ExtractingListings,

    /// A listing's detail page is being fetched and merged
    EnrichingDetail,

    /// Looking for the next-page control
    DecidingNextPage,

    // ===== Terminal Phases =====
    /// Result set exhausted (possibly with zero records)
    Done,

    /// The first page could not be fetched or held no listings
    Aborted,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Start, FetchingPage)
                | (FetchingPage, ExtractingListings)
                | (FetchingPage, Aborted)
                | (FetchingPage, Done)
                | (ExtractingListings, EnrichingDetail)
                | (ExtractingListings, DecidingNextPage)
                | (ExtractingListings, Aborted)
                | (EnrichingDetail, EnrichingDetail)
                | (EnrichingDetail, DecidingNextPage)
                | (DecidingNextPage, FetchingPage)
                | (DecidingNextPage, Done)
        )
    }

    /// Returns the phase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::FetchingPage => "fetching_page",
            Self::ExtractingListings => "extracting_listings",
            Self::EnrichingDetail => "enriching_detail",
            Self::DecidingNextPage => "deciding_next_page",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all phases
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Start,
            Self::FetchingPage,
            Self::ExtractingListings,
            Self::EnrichingDetail,
            Self::DecidingNextPage,
            Self::Done,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
