//! Crawl inputs and outputs
//!
//! - `SearchQuery`: the immutable input to one crawl
//! - `ListingStub`: fields read off one result-page card
//! - `DetailFields`: fields read off a listing's detail page
//! - `BusinessRecord`: the normalized, validated unit of output

use crate::QueryError;

/// What to search for and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    subject: String,
    location: String,
}

impl SearchQuery {
    /// Creates a query; the subject may be empty ("any business type")
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MissingLocation`] when `location` is blank.
    pub fn new(subject: impl Into<String>, location: impl Into<String>) -> Result<Self, QueryError> {
        let subject = subject.into().trim().to_string();
        let location = location.into().trim().to_string();

        if location.is_empty() {
            return Err(QueryError::MissingLocation);
        }

        Ok(Self { subject, location })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Partial record parsed from a single listing card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingStub {
    pub name: String,
    pub detail_url: Option<String>,
    pub location_text: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub categories: Vec<String>,
    pub description: Option<String>,
    pub website_hint: Option<String>,
}

/// Fields recovered from a business's detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub name: Option<String>,
    pub location_text: Option<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub website: Option<String>,
    pub categories: Vec<String>,
    pub description: Option<String>,
}

impl ListingStub {
    /// Merges detail-page values into the stub
    ///
    /// Stub values win for single-valued fields; detail values only fill
    /// gaps. Phones and emails are unioned with stub entries first.
    pub fn merge_detail(&mut self, detail: DetailFields) {
        if self.name.is_empty() {
            if let Some(name) = detail.name {
                self.name = name;
            }
        }

        if self.location_text.is_empty() {
            if let Some(location) = detail.location_text {
                self.location_text = location;
            }
        }

        append_unique(&mut self.phones, detail.phones);
        append_unique(&mut self.emails, detail.emails);

        if self.website_hint.is_none() {
            self.website_hint = detail.website;
        }

        if self.categories.is_empty() {
            self.categories = detail.categories;
        }

        if self.description.is_none() {
            self.description = detail.description;
        }
    }
}

fn append_unique(target: &mut Vec<String>, extra: Vec<String>) {
    for value in extra {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

/// One business in the crawl output
///
/// Records are created once from a validated stub; the only later mutation is
/// clearing `website` when another record already claimed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessRecord {
    pub name: String,
    pub location: String,
    pub county: Option<String>,
    pub phone: Option<String>,
    pub additional_phones: Vec<String>,
    pub email: Option<String>,
    pub additional_emails: Vec<String>,
    pub website: Option<String>,
    pub categories: Option<String>,
    pub description: Option<String>,
    pub detail_url: Option<String>,
}

impl BusinessRecord {
    /// Minimal-viability rule: name, location and county all present
    pub fn is_viable(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.location.trim().is_empty()
            && self.county.as_deref().is_some_and(|c| !c.is_empty())
    }
}
