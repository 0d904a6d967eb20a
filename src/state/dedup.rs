use std::collections::HashSet;

/// Session-scoped identifiers used to suppress repeated records
///
/// - detail URLs are compared exactly
/// - websites are compared lower-cased
/// - listings without a detail URL fall back to a lower-cased `name|location` key
#[derive(Debug, Clone, Default)]
pub struct DedupSet {
    seen_detail_urls: HashSet<String>,
    seen_websites: HashSet<String>,
    seen_name_keys: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a detail URL; returns false if it was already seen
    pub fn insert_detail_url(&mut self, url: &str) -> bool {
        self.seen_detail_urls.insert(url.to_string())
    }

    /// Records a website; returns false if another record already carries it
    pub fn insert_website(&mut self, website: &str) -> bool {
        self.seen_websites.insert(website.trim().to_lowercase())
    }

    /// Records a `name|location` key for a listing without a detail URL
    ///
    /// Returns false if the key was already seen.
    pub fn insert_name_key(&mut self, name: &str, location: &str) -> bool {
        let key = format!(
            "{}|{}",
            name.trim().to_lowercase(),
            location.trim().to_lowercase()
        );
        self.seen_name_keys.insert(key)
    }

    /// Forgets everything; used when a session starts a new scrape
    pub fn clear(&mut self) {
        self.seen_detail_urls.clear();
        self.seen_websites.clear();
        self.seen_name_keys.clear();
    }

    pub fn detail_url_count(&self) -> usize {
        self.seen_detail_urls.len()
    }

    pub fn website_count(&self) -> usize {
        self.seen_websites.len()
    }
}
