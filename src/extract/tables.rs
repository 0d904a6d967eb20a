//! Selector tables for the directory's listing and detail markup
//!
//! These selectors are the implicit contract with the directory site and are
//! expected to need updating when its markup changes.

use super::strategy::{Field, FieldSpec, Pick};

/// One search-result card
pub const LISTING_CONTAINER: &str = "div.listing_container";

/// Contact block on a detail page, searched before the whole document
pub const CONTACT_BLOCK: &str =
    "div.contact_info, div.business_contact, div.contact-details, div.contact-info";

/// Next-page controls, in priority order
pub const NEXT_PAGE_LINKS: &[&str] = &[
    "a.next_page",
    "a[rel='next']",
    "li.next a",
    ".pagination a.next",
];

/// Elements that may carry the total result count
pub const RESULT_COUNT_ELEMENTS: &[&str] = &[
    ".result_count",
    ".results_count",
    ".search_results_count",
    "h1",
];

/// Fields of a listing card
pub const LISTING_FIELDS: &[FieldSpec] = &[
    (
        Field::Name,
        &[
            ("h3.listing_title a.listing_title_link", Pick::Text),
            ("h3.listing_title", Pick::Text),
            (".listing_title", Pick::Text),
        ],
    ),
    (
        Field::DetailUrl,
        &[
            ("h3.listing_title a.listing_title_link", Pick::Href),
            ("h3.listing_title a", Pick::Href),
            ("a.listing_title_link", Pick::Href),
        ],
    ),
    (
        Field::Location,
        &[
            ("div.listing_address", Pick::Text),
            (".listing_address", Pick::Text),
            ("address", Pick::Text),
        ],
    ),
    (
        Field::Phone,
        &[
            ("a[href^='tel:']", Pick::TelHref),
            ("a.link_listing_number", Pick::Phones),
            ("", Pick::Phones),
        ],
    ),
    (
        Field::Email,
        &[
            ("a[href^='mailto:']", Pick::MailtoHref),
            ("", Pick::Emails),
            ("", Pick::ObfuscatedEmails),
        ],
    ),
    (
        Field::Website,
        &[
            ("div.listing_links a", Pick::WebsiteAnchor),
            ("a", Pick::WebsiteAnchor),
        ],
    ),
    (
        Field::Categories,
        &[("div.listing_categories a", Pick::EachText)],
    ),
    (Field::Description, &[("div.listing_summary", Pick::Text)]),
];

/// Fields of a business detail page
pub const DETAIL_FIELDS: &[FieldSpec] = &[
    (
        Field::Name,
        &[("h1", Pick::Text), (".business_name", Pick::Text)],
    ),
    (
        Field::Location,
        &[
            ("div.listing_address", Pick::Text),
            ("[itemprop='address']", Pick::Text),
            ("address", Pick::Text),
            (".business_address", Pick::Text),
        ],
    ),
    (
        Field::Phone,
        &[("a[href^='tel:']", Pick::TelHref), ("", Pick::Phones)],
    ),
    (
        Field::Email,
        &[
            ("a[href^='mailto:']", Pick::MailtoHref),
            ("", Pick::Emails),
            ("", Pick::ObfuscatedEmails),
        ],
    ),
    (
        Field::Website,
        &[
            ("a.website-link", Pick::Href),
            ("a.website", Pick::Href),
            ("a", Pick::WebsiteAnchor),
        ],
    ),
    (
        Field::Categories,
        &[
            ("div.listing_categories a", Pick::EachText),
            ("div.business_categories a", Pick::EachText),
            (".categories a", Pick::EachText),
        ],
    ),
    (
        Field::Description,
        &[
            ("div.business_description", Pick::Text),
            ("div.listing_summary", Pick::Text),
            (".description", Pick::Text),
        ],
    ),
];
