//! Ordered candidate strategies per field
//!
//! A field table maps each [`Field`] to a list of `(selector, pick)` pairs in
//! priority order. The extractor evaluates them in order and stops at the
//! first strategy that yields at least one accepted value.

use crate::normalize::{collapse_whitespace, phone_from_tel_href, Normalizer};
use crate::ExtractError;
use scraper::{ElementRef, Selector};

/// A record field the extractor knows how to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    DetailUrl,
    Location,
    Phone,
    Email,
    Website,
    Categories,
    Description,
}

/// How raw candidate values are read from the selected elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Visible text of the first element with any
    Text,
    /// Visible text of every element, in document order
    EachText,
    /// `href` of the first element carrying one
    Href,
    /// Numbers from `tel:` link targets
    TelHref,
    /// Addresses from `mailto:` link targets
    MailtoHref,
    /// `href` of anchors whose text or class mentions "website"
    WebsiteAnchor,
    /// Phone pattern matches in visible text
    Phones,
    /// Plain email matches in visible text
    Emails,
    /// "[at]" / "(dot)" style email matches in visible text
    ObfuscatedEmails,
}

/// One declarative strategy; an empty selector means the scope element itself
pub type StrategySpec = (&'static str, Pick);

/// One field's strategies in priority order
pub type FieldSpec = (Field, &'static [StrategySpec]);

/// A compiled strategy
#[derive(Debug, Clone)]
pub struct Strategy {
    selector: Option<Selector>,
    pick: Pick,
}

/// A compiled field table
#[derive(Debug, Clone)]
pub struct FieldTable {
    rules: Vec<(Field, Vec<Strategy>)>,
}

impl FieldTable {
    /// Compiles a declarative table
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Selector`] for the first selector that does
    /// not parse.
    pub fn compile(spec: &[FieldSpec]) -> Result<Self, ExtractError> {
        let mut rules = Vec::with_capacity(spec.len());

        for (field, strategies) in spec {
            let compiled = strategies
                .iter()
                .map(|(css, pick)| {
                    let selector = if css.is_empty() {
                        None
                    } else {
                        Some(compile_selector(css)?)
                    };
                    Ok(Strategy {
                        selector,
                        pick: *pick,
                    })
                })
                .collect::<Result<Vec<_>, ExtractError>>()?;
            rules.push((*field, compiled));
        }

        Ok(Self { rules })
    }

    /// Returns the strategies for `field`, empty if the table has none
    pub fn strategies(&self, field: Field) -> &[Strategy] {
        self.rules
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, strategies)| strategies.as_slice())
            .unwrap_or(&[])
    }
}

impl Strategy {
    /// Reads raw, unvalidated candidate values from `scope`
    pub fn candidates(&self, scope: ElementRef<'_>, normalizer: &Normalizer) -> Vec<String> {
        let elements: Vec<ElementRef<'_>> = match &self.selector {
            Some(selector) => scope.select(selector).collect(),
            None => vec![scope],
        };

        match self.pick {
            Pick::Text => elements
                .iter()
                .map(|el| visible_text(*el))
                .find(|text| !text.is_empty())
                .into_iter()
                .collect(),
            Pick::EachText => elements
                .iter()
                .map(|el| visible_text(*el))
                .filter(|text| !text.is_empty())
                .collect(),
            Pick::Href => elements
                .iter()
                .filter_map(|el| el.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty())
                .map(String::from)
                .into_iter()
                .collect(),
            Pick::TelHref => elements
                .iter()
                .filter_map(|el| el.value().attr("href"))
                .filter_map(phone_from_tel_href)
                .collect(),
            Pick::MailtoHref => elements
                .iter()
                .filter_map(|el| el.value().attr("href"))
                .filter(|href| href.trim().to_lowercase().starts_with("mailto:"))
                .map(String::from)
                .collect(),
            Pick::WebsiteAnchor => elements
                .iter()
                .filter(|el| mentions_website(**el))
                .filter_map(|el| el.value().attr("href"))
                .map(|href| href.trim().to_string())
                .collect(),
            Pick::Phones => elements
                .iter()
                .flat_map(|el| normalizer.phones.find_in_text(&visible_text(*el)))
                .collect(),
            Pick::Emails => elements
                .iter()
                .flat_map(|el| normalizer.email.find_in_text(&visible_text(*el)))
                .collect(),
            Pick::ObfuscatedEmails => elements
                .iter()
                .flat_map(|el| normalizer.email.find_obfuscated(&visible_text(*el)))
                .collect(),
        }
    }
}

/// Parses a CSS selector, mapping the borrowed parse error to an owned one
pub fn compile_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collects an element's text, skipping script and style content
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| matches!(el.value().name(), "script" | "style" | "noscript"));
        if !hidden {
            parts.push(text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

fn mentions_website(element: ElementRef<'_>) -> bool {
    if visible_text(element).to_lowercase().contains("website") {
        return true;
    }
    element
        .value()
        .attr("class")
        .is_some_and(|class| class.to_lowercase().contains("website"))
}
