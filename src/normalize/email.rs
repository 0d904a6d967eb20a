use regex::Regex;

/// Consumer mail domains accepted without further scrutiny
///
/// Anything else that is syntactically valid is accepted too; business
/// domains are the common case.
pub const CONSUMER_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "yahoo.ie",
    "yahoo.co.uk",
    "hotmail.com",
    "hotmail.co.uk",
    "outlook.com",
    "outlook.ie",
    "live.com",
    "live.ie",
    "icloud.com",
    "me.com",
    "eircom.net",
    "aol.com",
];

/// TLD fragments that the directory's markup tends to duplicate
const DUPLICATED_TLDS: &[&str] = &[".ie", ".com"];

/// Returns true if `domain` is one of the consumer mail providers
pub fn is_consumer_domain(domain: &str) -> bool {
    let domain = domain.trim().to_lowercase();
    CONSUMER_DOMAINS.contains(&domain.as_str())
}

/// Cleans scraping artifacts out of an email candidate
///
/// Lower-cases, drops a `mailto:` prefix and query, strips digits glued in
/// front of "info" in the local part (`3info@x.ie` → `info@x.ie`) and
/// collapses a duplicated TLD fragment in the domain
/// (`example.iexample.ie` → `example.ie`). The result is not validated;
/// `clean_email` is idempotent.
///
/// # Examples
///
/// ```
/// use directory_harvester::normalize::clean_email;
///
/// assert_eq!(clean_email("3info@example.iexample.ie"), "info@example.ie");
/// ```
pub fn clean_email(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut candidate = lowered.as_str();

    loop {
        let trimmed = candidate
            .split('?')
            .next()
            .unwrap_or_default()
            .trim_matches(is_edge_junk);
        match trimmed.strip_prefix("mailto:") {
            Some(rest) => candidate = rest,
            None => {
                candidate = trimmed;
                break;
            }
        }
    }

    match candidate.split_once('@') {
        Some((local, domain)) => format!(
            "{}@{}",
            strip_digits_before_info(local),
            collapse_duplicated_tld(domain)
        ),
        None => candidate.to_string(),
    }
}

fn is_edge_junk(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '<' | '>' | '"' | '\'')
}

fn strip_digits_before_info(local: &str) -> String {
    let mut out = String::with_capacity(local.len());
    let mut rest = local;

    while let Some(idx) = rest.find("info") {
        out.push_str(rest[..idx].trim_end_matches(|c: char| c.is_ascii_digit()));
        out.push_str("info");
        rest = &rest[idx + "info".len()..];
    }

    out.push_str(rest);
    out
}

fn collapse_duplicated_tld(domain: &str) -> String {
    let mut current = domain.to_string();

    // Each pass strictly shortens the domain, so this reaches a fixpoint
    'outer: loop {
        for tld in DUPLICATED_TLDS {
            if let Some(idx) = current.find(tld) {
                let end = idx + tld.len();
                if end < current.len() && current[end..].contains(tld) {
                    current = format!("{}{}", &current[..idx], tld);
                    continue 'outer;
                }
            }
        }
        return current;
    }
}

/// Email syntax checks and text scanning
#[derive(Debug, Clone)]
pub struct EmailNormalizer {
    /// Anchored `local@domain.tld` check for cleaned values
    valid: Regex,
    /// Unanchored pattern for scanning visible text
    scan: Regex,
    /// `[at]` / `(at)` tokens, any case
    bracket_at: Regex,
    /// `[dot]` / `(dot)` tokens, any case
    bracket_dot: Regex,
    /// Upper-case ` AT ` / ` DOT ` and spaced ` @ ` / ` . `
    spaced_at: Regex,
    spaced_dot: Regex,
    /// Longest value accepted from directory pages
    max_len: usize,
}

impl EmailNormalizer {
    /// Compiles the email patterns
    ///
    /// `max_len` bounds the length of accepted directory emails.
    pub fn new(max_len: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            valid: Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9-]+(\.[a-z0-9-]+)*\.[a-z]{2,}$")?,
            scan: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
            bracket_at: Regex::new(r"(?i)\s*[\[(]\s*at\s*[\])]\s*")?,
            bracket_dot: Regex::new(r"(?i)\s*[\[(]\s*dot\s*[\])]\s*")?,
            spaced_at: Regex::new(r"\s+(?:AT|@)\s+")?,
            spaced_dot: Regex::new(r"(\w)\s+(?:DOT|\.)\s+(\w)")?,
            max_len,
        })
    }

    /// Returns true if an already-cleaned value is a syntactically valid address
    pub fn is_valid(&self, email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.starts_with('.') || local.ends_with('.') {
            return false;
        }

        // Fast path for well-known providers; the local part still has to be sane
        if is_consumer_domain(domain) {
            return local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));
        }

        self.valid.is_match(email)
    }

    /// Cleans and validates a candidate taken from a directory page
    ///
    /// Returns `None` for values that fail syntax validation or exceed the
    /// directory length limit.
    pub fn validate(&self, raw: &str) -> Option<String> {
        let cleaned = clean_email(raw);
        if cleaned.len() > self.max_len || !self.is_valid(&cleaned) {
            return None;
        }
        Some(cleaned)
    }

    /// Scans visible text for plainly written addresses
    pub fn find_in_text(&self, text: &str) -> Vec<String> {
        self.scan
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Scans visible text for addresses written as "name [at] domain [dot] ie"
    pub fn find_obfuscated(&self, text: &str) -> Vec<String> {
        let text = self.bracket_at.replace_all(text, "@");
        let text = self.bracket_dot.replace_all(&text, ".");
        let text = self.spaced_at.replace_all(&text, "@");
        let text = self.spaced_dot.replace_all(&text, "$1.$2");
        self.find_in_text(&text)
    }
}
