//! Normalization and validation of scraped contact fields
//!
//! Everything here is a pure function of its input: no I/O and no state
//! beyond compiled patterns.
//!
//! # Components
//!
//! - `email`: email cleanup, strict validation, plain and obfuscated scanning
//! - `phone`: phone pattern matching and `tel:` link decoding
//! - `website`: website validation (own-domain, social, tracking, asset rules)
//! - `county`: the 26-county taxonomy and county derivation
//! - `text`: whitespace and business-name cleanup

mod county;
mod email;
mod phone;
mod text;
mod website;

pub use county::{canonical_county, extract_county, COUNTIES};
pub use email::{clean_email, is_consumer_domain, EmailNormalizer, CONSUMER_DOMAINS};
pub use phone::{phone_from_tel_href, PhoneMatcher};
pub use text::{clean_business_name, collapse_whitespace};
pub use website::WebsiteValidator;

/// The normalizers one directory crawl needs, compiled once
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub email: EmailNormalizer,
    pub phones: PhoneMatcher,
    pub websites: WebsiteValidator,
}

impl Normalizer {
    /// Compiles the normalizers for a directory hosted at `own_domain`
    ///
    /// # Arguments
    ///
    /// * `own_domain` - The directory's host, excluded from website values
    /// * `max_email_len` - Longest email accepted from directory pages
    pub fn new(own_domain: &str, max_email_len: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            email: EmailNormalizer::new(max_email_len)?,
            phones: PhoneMatcher::new()?,
            websites: WebsiteValidator::new(own_domain),
        })
    }
}
