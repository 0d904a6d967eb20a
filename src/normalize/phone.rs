use crate::normalize::collapse_whitespace;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Phone number discovery
///
/// Matches a 2-3 digit area code (optionally parenthesised), a 3-4 digit
/// group and a 4 digit group, with optional spaces or dashes between.
#[derive(Debug, Clone)]
pub struct PhoneMatcher {
    pattern: Regex,
}

impl PhoneMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"\(?\b\d{2,3}\)?[\s.-]?\d{3,4}[\s.-]?\d{4}\b")?,
        })
    }

    /// Finds phone numbers in visible text, deduplicated in discovery order
    pub fn find_in_text(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in self.pattern.find_iter(text) {
            let phone = collapse_whitespace(m.as_str());
            if !found.contains(&phone) {
                found.push(phone);
            }
        }
        found
    }
}

/// Extracts the number from a `tel:` link target
///
/// Returns `None` for non-`tel:` targets or targets without digits.
pub fn phone_from_tel_href(href: &str) -> Option<String> {
    let href = href.trim();
    let number = href
        .strip_prefix("tel:")
        .or_else(|| href.strip_prefix("TEL:"))?;
    let decoded = percent_decode_str(number).decode_utf8_lossy();
    let phone = collapse_whitespace(&decoded);

    if phone.chars().any(|c| c.is_ascii_digit()) {
        Some(phone)
    } else {
        None
    }
}
