//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients that present a browser identity to the directory
//! - Pacing every request through the fetcher's [`RateLimiter`]
//! - Retry logic with status-specific backoff
//! - Proxy rotation on blocks and network failures
//! - Error classification

use crate::config::{Config, FetchConfig, SiteConfig};
use crate::crawler::rate_limiter::RateLimiter;
use crate::{ConfigError, FetchError, FetchResult, HarvestError};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, ORIGIN, PRAGMA, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{redirect::Policy, Client, Proxy, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,

    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Page body content
    pub body: String,
}

/// A capability that turns a URL into a page body
///
/// [`HttpFetcher`] is the provided implementation. A browser-rendering source
/// for JavaScript-dependent pages can implement the same trait, and the
/// pagination controller works with either.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetches one page
    ///
    /// Implementations apply their own pacing and retry policy and return
    /// [`FetchError::Exhausted`] once retries run out.
    async fn fetch(&mut self, url: &str) -> FetchResult<FetchedPage>;
}

/// Builds the default browser-like header set
///
/// `Referer` and `Origin` point at the directory's base URL.
fn default_headers(base_url: &Url) -> Result<HeaderMap, ConfigError> {
    let invalid = |e: reqwest::header::InvalidHeaderValue| {
        ConfigError::InvalidUrl(format!("{} ({})", base_url, e))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-IE,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(
        REFERER,
        HeaderValue::from_str(base_url.as_str()).map_err(invalid)?,
    );
    headers.insert(
        ORIGIN,
        HeaderValue::from_str(&base_url.origin().ascii_serialization()).map_err(invalid)?,
    );

    Ok(headers)
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `site` - The site configuration (for `Referer`/`Origin`)
/// * `fetch` - The fetch configuration (user agent, timeouts)
/// * `proxy` - Optional proxy URL routing all traffic of this client
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - Invalid base URL, proxy or client settings
///
/// # Example
///
/// ```no_run
/// use directory_harvester::config::Config;
/// use directory_harvester::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.site, &config.fetch, None).unwrap();
/// ```
pub fn build_http_client(
    site: &SiteConfig,
    fetch: &FetchConfig,
    proxy: Option<&str>,
) -> Result<Client, HarvestError> {
    let base_url = Url::parse(&site.base_url)?;

    let mut builder = Client::builder()
        .user_agent(fetch.user_agent.as_str())
        .default_headers(default_headers(&base_url)?)
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}

/// Paced, retrying HTTP page source
///
/// Owns one client per configured proxy (or a single direct client) and the
/// rate limiter every request passes through. A fetcher belongs to exactly
/// one crawl session.
#[derive(Debug)]
pub struct HttpFetcher {
    /// One client per proxy, or a single direct client
    clients: Vec<Client>,

    /// Index of the client in use
    active: usize,

    limiter: RateLimiter,
    max_attempts: u32,
    rate_limit_backoff: Duration,
    error_backoff: Duration,
    rotate_on_forbidden: bool,
}

impl HttpFetcher {
    /// Creates a fetcher from the site and fetch sections of the configuration
    pub fn new(site: &SiteConfig, fetch: &FetchConfig) -> Result<Self, HarvestError> {
        let clients = if fetch.proxies.is_empty() {
            vec![build_http_client(site, fetch, None)?]
        } else {
            fetch
                .proxies
                .iter()
                .map(|proxy| build_http_client(site, fetch, Some(proxy.as_str())))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            clients,
            active: 0,
            limiter: RateLimiter::from_config(fetch),
            max_attempts: fetch.max_attempts.max(1),
            rate_limit_backoff: Duration::from_secs(fetch.rate_limit_backoff_secs),
            error_backoff: Duration::from_secs(fetch.error_backoff_secs),
            rotate_on_forbidden: fetch.rotate_on_forbidden,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Self::new(&config.site, &config.fetch)
    }

    /// Number of requests issued so far, retries included
    pub fn request_count(&self) -> u64 {
        self.limiter.request_count()
    }

    /// Index of the client (proxy) currently in use
    pub fn active_client(&self) -> usize {
        self.active
    }

    /// Switches to the next proxy; a no-op without a proxy pool
    fn rotate_proxy(&mut self) {
        if self.clients.len() > 1 {
            self.active = (self.active + 1) % self.clients.len();
            tracing::info!(
                "Rotating to proxy {}/{}",
                self.active + 1,
                self.clients.len()
            );
        }
    }

    /// Performs one request with the active client
    async fn attempt(&self, url: &str) -> FetchResult<FetchedPage> {
        let client = &self.clients[self.active];

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::Forbidden {
                url: url.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::HttpError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

impl PageSource for HttpFetcher {
    /// Fetches a URL with pacing, retries and backoff
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 403 | Rotate proxy (if enabled), retry |
    /// | HTTP 429 | Sleep `rate_limit_backoff * attempt`, retry |
    /// | Timeout / connection failure | Rotate proxy, retry |
    /// | Other non-2xx | Sleep `error_backoff * attempt`, retry |
    ///
    /// Every attempt waits on the rate limiter first. After the last attempt
    /// the final error is wrapped in [`FetchError::Exhausted`].
    async fn fetch(&mut self, url: &str) -> FetchResult<FetchedPage> {
        Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            self.limiter.acquire().await;
            tracing::debug!("GET {} (attempt {}/{})", url, attempt, self.max_attempts);

            let err = match self.attempt(url).await {
                Ok(page) => return Ok(page),
                Err(err) => err,
            };

            let retries_left = attempt < self.max_attempts;
            tracing::warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt,
                self.max_attempts,
                url,
                err
            );

            match &err {
                FetchError::Forbidden { .. } => {
                    if self.rotate_on_forbidden {
                        self.rotate_proxy();
                    }
                }
                FetchError::RateLimited { .. } => {
                    if retries_left {
                        let wait = self.rate_limit_backoff * attempt;
                        tracing::warn!("Rate limited, backing off {:?}", wait);
                        tokio::time::sleep(wait).await;
                    }
                }
                e if e.is_network() => self.rotate_proxy(),
                _ => {
                    if retries_left {
                        tokio::time::sleep(self.error_backoff * attempt).await;
                    }
                }
            }

            if !retries_left {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
        }
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Connection {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
