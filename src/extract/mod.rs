//! Field extraction from result pages and detail pages
//!
//! Extraction is driven by the declarative tables in `tables`: each field has
//! an ordered list of candidate strategies, and the first strategy yielding an
//! accepted value wins. Every candidate passes through the normalizers before
//! it is accepted. A missing element yields an empty value, never an error.
//!
//! Pages are parsed synchronously and the parsed document never outlives the
//! call, so callers can hold an [`Extractor`] across await points.

mod page;
mod strategy;
mod tables;

pub use page::{resolve_link, PageRules};
pub use strategy::{visible_text, Field, FieldSpec, FieldTable, Pick, StrategySpec};

use crate::normalize::{clean_business_name, collapse_whitespace, Normalizer};
use crate::record::{DetailFields, ListingStub};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Everything read off one result page
#[derive(Debug, Clone, Default)]
pub struct ResultsPage {
    pub listings: Vec<ListingStub>,
    /// Total count reported by the directory, if it could be read
    pub total_reported: Option<u64>,
    pub next_url: Option<String>,
}

/// Compiled extraction tables for one directory site
#[derive(Debug, Clone)]
pub struct Extractor {
    normalizer: Normalizer,
    own_domain: String,
    listing_container: Selector,
    listing: FieldTable,
    contact_block: Selector,
    detail: FieldTable,
    pages: PageRules,
}

impl Extractor {
    /// Compiles the extraction tables for the directory at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - The directory's base URL; its host is excluded from
    ///   websites and emails
    /// * `max_email_len` - Longest email accepted from directory pages
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - All selectors and patterns compiled
    /// * `Err(ExtractError)` - A selector or pattern is invalid
    pub fn new(base_url: &Url, max_email_len: usize) -> Result<Self, ExtractError> {
        let host = base_url.host_str().unwrap_or_default().to_lowercase();
        let own_domain = host.strip_prefix("www.").unwrap_or(&host).to_string();

        Ok(Self {
            normalizer: Normalizer::new(&host, max_email_len)?,
            own_domain,
            listing_container: strategy::compile_selector(tables::LISTING_CONTAINER)?,
            listing: FieldTable::compile(tables::LISTING_FIELDS)?,
            contact_block: strategy::compile_selector(tables::CONTACT_BLOCK)?,
            detail: FieldTable::compile(tables::DETAIL_FIELDS)?,
            pages: PageRules::new()?,
        })
    }

    /// Extracts the listings, reported total and next-page URL of a result page
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `page_url` - The URL the page was fetched from, for resolving links
    /// * `expected_next_path` - The search path of the following page number
    pub fn results_page(&self, html: &str, page_url: &Url, expected_next_path: &str) -> ResultsPage {
        let document = Html::parse_document(html);

        let listings = document
            .select(&self.listing_container)
            .map(|card| self.listing_stub(card, page_url))
            .collect();

        ResultsPage {
            listings,
            total_reported: self.pages.total_count(&document),
            next_url: self
                .pages
                .next_page_url(&document, page_url, expected_next_path),
        }
    }

    /// Reads one listing card into a stub
    fn listing_stub(&self, card: ElementRef<'_>, page_url: &Url) -> ListingStub {
        let scopes = [card];
        let first = |field| self.values(&self.listing, field, &scopes, page_url).into_iter().next();

        ListingStub {
            name: first(Field::Name).unwrap_or_default(),
            detail_url: first(Field::DetailUrl),
            location_text: first(Field::Location).unwrap_or_default(),
            phones: self.values(&self.listing, Field::Phone, &scopes, page_url),
            emails: self.values(&self.listing, Field::Email, &scopes, page_url),
            categories: self.values(&self.listing, Field::Categories, &scopes, page_url),
            description: first(Field::Description),
            website_hint: first(Field::Website),
        }
    }

    /// Extracts a business detail page
    ///
    /// Each field is looked up in the contact block first and in the whole
    /// document second. When no website is found, one is derived from an
    /// `info@` address.
    pub fn detail_page(&self, html: &str, page_url: &Url) -> DetailFields {
        let document = Html::parse_document(html);
        let mut scopes: Vec<ElementRef<'_>> = document.select(&self.contact_block).take(1).collect();
        scopes.push(document.root_element());

        let first = |field| self.values(&self.detail, field, &scopes, page_url).into_iter().next();
        let emails = self.values(&self.detail, Field::Email, &scopes, page_url);
        let website = first(Field::Website).or_else(|| {
            emails
                .iter()
                .find_map(|email| self.normalizer.websites.from_info_email(email))
        });

        DetailFields {
            name: first(Field::Name),
            location_text: first(Field::Location),
            phones: self.values(&self.detail, Field::Phone, &scopes, page_url),
            emails,
            website,
            categories: self.values(&self.detail, Field::Categories, &scopes, page_url),
            description: first(Field::Description),
        }
    }

    /// Runs a field's strategies over each scope in turn
    ///
    /// Returns the accepted values of the first strategy that yields any,
    /// deduplicated in discovery order.
    fn values(
        &self,
        table: &FieldTable,
        field: Field,
        scopes: &[ElementRef<'_>],
        page_url: &Url,
    ) -> Vec<String> {
        for scope in scopes {
            for strategy in table.strategies(field) {
                let mut accepted: Vec<String> = Vec::new();
                for raw in strategy.candidates(*scope, &self.normalizer) {
                    if let Some(value) = self.accept(field, &raw, page_url) {
                        if !accepted.contains(&value) {
                            accepted.push(value);
                        }
                    }
                }
                if !accepted.is_empty() {
                    return accepted;
                }
            }
        }
        Vec::new()
    }

    /// Normalizes and validates one raw candidate for `field`
    fn accept(&self, field: Field, raw: &str, page_url: &Url) -> Option<String> {
        match field {
            Field::Name => Some(clean_business_name(raw)).filter(|name| !name.is_empty()),
            Field::DetailUrl => resolve_link(raw, page_url),
            Field::Email => self
                .normalizer
                .email
                .validate(raw)
                .filter(|email| !self.is_own_email(email)),
            Field::Website => self.normalizer.websites.validate(raw),
            Field::Location | Field::Phone | Field::Categories | Field::Description => {
                Some(collapse_whitespace(raw)).filter(|value| !value.is_empty())
            }
        }
    }

    /// The directory's own addresses appear on every page
    fn is_own_email(&self, email: &str) -> bool {
        !self.own_domain.is_empty()
            && email
                .rsplit_once('@')
                .is_some_and(|(_, domain)| is_within_domain(domain, &self.own_domain))
    }
}

/// True for `domain` itself and any of its subdomains
fn is_within_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
