/// The 26 counties used as the location taxonomy
///
/// Order matters only for substring fallback: the first county contained in a
/// token wins.
pub const COUNTIES: [&str; 26] = [
    "Carlow",
    "Cavan",
    "Clare",
    "Cork",
    "Donegal",
    "Dublin",
    "Galway",
    "Kerry",
    "Kildare",
    "Kilkenny",
    "Laois",
    "Leitrim",
    "Limerick",
    "Longford",
    "Louth",
    "Mayo",
    "Meath",
    "Monaghan",
    "Offaly",
    "Roscommon",
    "Sligo",
    "Tipperary",
    "Waterford",
    "Westmeath",
    "Wexford",
    "Wicklow",
];

/// Derives the county named in a free-text location
///
/// The text is comma-stripped and whitespace-tokenized. A token equal to a
/// county name (case-insensitive) wins first; otherwise the first county
/// contained in any token is returned. This keeps "Westmeath" from resolving
/// to "Meath" while still matching glued tokens like "Dublin15".
///
/// # Examples
///
/// ```
/// use directory_harvester::normalize::extract_county;
///
/// assert_eq!(extract_county("Main St, Blackrock, Co. Dublin"), Some("Dublin"));
/// assert_eq!(extract_county("Mullingar, Co. Westmeath"), Some("Westmeath"));
/// assert_eq!(extract_county("Somewhere else"), None);
/// ```
pub fn extract_county(location: &str) -> Option<&'static str> {
    let tokens: Vec<String> = location
        .replace(',', " ")
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    if tokens.is_empty() {
        return None;
    }

    let exact = COUNTIES.iter().find(|county| {
        let county = county.to_lowercase();
        tokens.iter().any(|t| t.trim_matches('.') == county)
    });

    if let Some(county) = exact {
        return Some(county);
    }

    COUNTIES.iter().copied().find(|county| {
        let county = county.to_lowercase();
        tokens.iter().any(|t| t.contains(&county))
    })
}

/// Returns the canonical county name when `name` is exactly a county
///
/// Accepts an optional "Co." / "County" prefix.
pub fn canonical_county(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();
    let bare = lower
        .strip_prefix("county ")
        .or_else(|| lower.strip_prefix("co. "))
        .or_else(|| lower.strip_prefix("co "))
        .unwrap_or(&lower)
        .trim();

    COUNTIES
        .iter()
        .copied()
        .find(|county| county.eq_ignore_ascii_case(bare))
}
