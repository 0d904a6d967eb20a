//! Result-page level extraction: next-page control and total count

use super::strategy::{compile_selector, visible_text};
use super::tables::{NEXT_PAGE_LINKS, RESULT_COUNT_ELEMENTS};
use crate::ExtractError;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Compiled selectors and patterns for pagination and result counts
#[derive(Debug, Clone)]
pub struct PageRules {
    next_links: Vec<Selector>,
    count_elements: Vec<Selector>,
    count_pattern: Regex,
    anchors: Selector,
}

impl PageRules {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            next_links: NEXT_PAGE_LINKS
                .iter()
                .map(|css| compile_selector(css))
                .collect::<Result<_, _>>()?,
            count_elements: RESULT_COUNT_ELEMENTS
                .iter()
                .map(|css| compile_selector(css))
                .collect::<Result<_, _>>()?,
            count_pattern: Regex::new(r"(?i)(\d[\d,]*)\s+(?:results|businesses|listings)")?,
            anchors: compile_selector("a[href]")?,
        })
    }

    /// Finds the URL of the next result page
    ///
    /// Explicit next-page controls are tried first; failing that, any anchor
    /// whose resolved path equals `expected_next_path` is used.
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed result page
    /// * `page_url` - The URL the page was fetched from
    /// * `expected_next_path` - The search path for the following page number
    pub fn next_page_url(
        &self,
        document: &Html,
        page_url: &Url,
        expected_next_path: &str,
    ) -> Option<String> {
        for selector in &self.next_links {
            let found = document
                .select(selector)
                .filter_map(|el| el.value().attr("href"))
                .find_map(|href| resolve_link(href, page_url));
            if found.is_some() {
                return found;
            }
        }

        let expected = expected_next_path.trim_end_matches('/');
        document
            .select(&self.anchors)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| resolve_link(href, page_url))
            .find(|candidate| {
                Url::parse(candidate)
                    .map(|url| url.path().trim_end_matches('/') == expected)
                    .unwrap_or(false)
            })
    }

    /// Reads the total result count the directory reports, if any
    pub fn total_count(&self, document: &Html) -> Option<u64> {
        self.count_elements.iter().find_map(|selector| {
            document.select(selector).find_map(|el| {
                let text = visible_text(el);
                let caps = self.count_pattern.captures(&text)?;
                caps.get(1)?.as_str().replace(',', "").parse().ok()
            })
        })
    }
}

/// Resolves a link href against the page it appeared on
///
/// Returns None for empty, fragment-only and pseudo-scheme links, and for
/// anything that does not resolve to HTTP(S).
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
