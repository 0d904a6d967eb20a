use crate::normalize::email::is_consumer_domain;
use url::Url;

/// Social-media and review platforms whose profile pages are not business websites
const SOCIAL_HOSTS: &[&str] = &[
    "facebook.com",
    "fb.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "pinterest.com",
    "yelp.com",
    "tripadvisor.com",
    "tripadvisor.ie",
];

/// Path/query fragments used by redirect and ad-tracking links
const TRACKING_FRAGMENTS: &[&str] = &[
    "redirect",
    "click.php",
    "track.php",
    "/ads/",
    "/aclk",
    "doubleclick.net",
    "googleadservices",
];

/// Link schemes that never point at a web page
const PSEUDO_SCHEMES: &[&str] = &["tel:", "mailto:", "javascript:"];

/// File extensions that are assets, not pages
const NON_PAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".bmp", ".ico", ".pdf", ".doc", ".docx",
    ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".mp3", ".mp4", ".css", ".js",
];

/// Website validation rules for one directory
///
/// The directory's own domain is excluded in addition to the fixed social,
/// tracking and asset rules.
#[derive(Debug, Clone)]
pub struct WebsiteValidator {
    own_domain: String,
}

impl WebsiteValidator {
    /// Creates a validator excluding `own_domain` (a leading "www." is ignored)
    pub fn new(own_domain: &str) -> Self {
        let own_domain = own_domain.trim().to_lowercase();
        let own_domain = own_domain
            .strip_prefix("www.")
            .unwrap_or(&own_domain)
            .to_string();
        Self { own_domain }
    }

    /// Returns the validated website, or `None` if the candidate is rejected
    ///
    /// # Examples
    ///
    /// ```
    /// use directory_harvester::normalize::WebsiteValidator;
    ///
    /// let validator = WebsiteValidator::new("www.goldenpages.ie");
    /// assert!(validator.validate("https://www.goldenpages.ie/business/1234").is_none());
    /// assert!(validator.validate("https://www.murphyplumbing.ie").is_some());
    /// ```
    pub fn validate(&self, candidate: &str) -> Option<String> {
        let candidate = candidate.trim();
        let lower = candidate.to_lowercase();

        if PSEUDO_SCHEMES.iter().any(|scheme| lower.contains(scheme)) {
            return None;
        }

        if !self.own_domain.is_empty() && lower.contains(&self.own_domain) {
            return None;
        }

        let url = Url::parse(candidate).ok()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }

        let host = url.host_str().filter(|h| !h.is_empty())?.to_lowercase();
        if SOCIAL_HOSTS
            .iter()
            .any(|social| host == *social || host.ends_with(&format!(".{}", social)))
        {
            return None;
        }

        if TRACKING_FRAGMENTS.iter().any(|frag| lower.contains(frag)) {
            return None;
        }

        let path = url.path().to_lowercase();
        if NON_PAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return None;
        }

        Some(candidate.to_string())
    }

    /// Derives `https://www.<domain>` from an `info@<domain>` address
    ///
    /// Consumer mail domains never yield a website.
    pub fn from_info_email(&self, email: &str) -> Option<String> {
        let domain = email.trim().to_lowercase().strip_prefix("info@")?.to_string();
        if domain.is_empty() || is_consumer_domain(&domain) {
            return None;
        }
        self.validate(&format!("https://www.{}", domain))
    }
}
