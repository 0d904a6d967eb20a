/// Badge phrases the directory appends to listing titles
const TRAILING_BADGES: &[&str] = &[
    "this is a verified listing.find out more",
    "this is a verified listing. find out more",
    "verified listing",
    "sponsored",
];

/// Collapses runs of whitespace to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a listing title into a business name
///
/// Strips a leading ordinal ("12.") and any trailing
/// "Sponsored" / verification badge text.
///
/// # Examples
///
/// ```
/// use directory_harvester::normalize::clean_business_name;
///
/// assert_eq!(clean_business_name("3. Murphy Plumbing Sponsored"), "Murphy Plumbing");
/// ```
pub fn clean_business_name(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let mut name = strip_leading_ordinal(&collapsed).to_string();

    loop {
        let mut stripped = false;
        for badge in TRAILING_BADGES {
            if ends_with_ignore_ascii_case(&name, badge) {
                name.truncate(name.len() - badge.len());
                name = name.trim_end().to_string();
                stripped = true;
            }
        }
        if !stripped {
            break;
        }
    }

    name
}

fn strip_leading_ordinal(name: &str) -> &str {
    let digits_end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());

    if digits_end == 0 || digits_end == name.len() {
        return name;
    }

    let rest = &name[digits_end..];
    match rest.strip_prefix('.') {
        Some(after_dot) => after_dot.trim_start(),
        None => name,
    }
}

fn ends_with_ignore_ascii_case(text: &str, suffix: &str) -> bool {
    if text.len() < suffix.len() {
        return false;
    }
    let start = text.len() - suffix.len();
    text.is_char_boundary(start) && text[start..].eq_ignore_ascii_case(suffix)
}
