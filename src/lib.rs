//! Directory-Harvester: a paced crawler for paginated business directories
//!
//! This crate walks the result pages of a business-directory search, extracts
//! each listing (optionally enriching it from the listing's detail page),
//! normalizes the contact fields, and returns a deduplicated table of
//! business records.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Directory-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction setup error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Invalid search query: {0}")]
    Query(#[from] QueryError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a single page
///
/// Individual attempts fail with one of the transport or status variants;
/// once the retry ceiling is reached the fetch client surfaces
/// [`FetchError::Exhausted`] wrapping the last cause.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failure for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Access forbidden (HTTP 403) for {url}")]
    Forbidden { url: String },

    #[error("Rate limited (HTTP 429) for {url}")]
    RateLimited { url: String },

    #[error("HTTP {status} for {url}")]
    HttpError { url: String, status: u16 },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns the URL this error refers to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connection { url, .. }
            | Self::Forbidden { url }
            | Self::RateLimited { url }
            | Self::HttpError { url, .. }
            | Self::InvalidUrl { url, .. }
            | Self::Exhausted { url, .. } => url,
        }
    }

    /// Returns true for network-level failures (no HTTP response received)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }

    /// Returns the innermost cause, unwrapping [`FetchError::Exhausted`]
    pub fn root_cause(&self) -> &FetchError {
        match self {
            Self::Exhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }
}

/// Errors raised while compiling the extraction tables
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Search query errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("A location is required")]
    MissingLocation,
}

/// Result type alias for Directory-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single-page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSession, HttpFetcher, PageSource, ScrapeReport, SessionFailure};
pub use record::{BusinessRecord, SearchQuery};
pub use state::{CrawlMetrics, CrawlPhase, DedupSet};
