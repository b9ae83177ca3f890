//! Field extraction for a single product card.
//!
//! Optional parts of a card come in several markup shapes. Each field first
//! resolves which shape the card carries (a marker), then parses the value
//! for that marker only.

use crate::error::ExtractError;
use crate::parsers::CompiledSelectors;
use crate::results::Product;
use crate::utils::element_text;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Currency suffix of listed prices
const CURRENCY_SUFFIX: &str = "грн";

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:[.,]\d+)?)\s*%").expect("Percent pattern should be valid")
});

/// Which price markup a card carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMarker<'a> {
    /// Price is expected later or not set
    Expected,
    /// Discounted price, holding the card so the new price can be looked up
    OnAction(ElementRef<'a>),
    /// Regular listed price
    Standard(ElementRef<'a>),
    /// None of the known price shapes
    Unmatched,
}

impl<'a> PriceMarker<'a> {
    pub fn resolve(card: ElementRef<'a>, selectors: &CompiledSelectors) -> Self {
        if first(card, &selectors.price_expected).is_some() {
            PriceMarker::Expected
        } else if first(card, &selectors.price_action).is_some() {
            PriceMarker::OnAction(card)
        } else if let Some(price) = first(card, &selectors.price_standard) {
            PriceMarker::Standard(price)
        } else {
            PriceMarker::Unmatched
        }
    }
}

/// Stock markup of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    InStore,
    NotInStore,
    Undetermined,
}

impl Presence {
    pub fn resolve(card: ElementRef<'_>, selectors: &CompiledSelectors) -> Self {
        if let Some(marker) = first(card, &selectors.in_store) {
            match &selectors.in_store_label {
                Some(label) if element_text(marker) != *label => Presence::NotInStore,
                _ => Presence::InStore,
            }
        } else if first(card, &selectors.not_in_store).is_some() {
            Presence::NotInStore
        } else {
            Presence::Undetermined
        }
    }

    pub fn in_store(self) -> bool {
        matches!(self, Presence::InStore)
    }
}

/// Review count markup of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reviews<'a> {
    Count(ElementRef<'a>),
    Absent,
}

impl<'a> Reviews<'a> {
    pub fn resolve(card: ElementRef<'a>, selectors: &CompiledSelectors) -> Self {
        match first(card, &selectors.reviews) {
            Some(node) => Reviews::Count(node),
            None => Reviews::Absent,
        }
    }
}

/// Extract a product record from a product card
pub fn extract(
    card: ElementRef<'_>,
    selectors: &CompiledSelectors,
) -> Result<Product, ExtractError> {
    let title = title(card, selectors)?;
    let price = price(card, selectors)?;
    let rating = rating(card, selectors)?;
    let presence_in_store = Presence::resolve(card, selectors).in_store();
    let num_of_reviews = num_of_reviews(card, selectors)?;

    Ok(Product {
        title,
        price,
        rating,
        presence_in_store,
        num_of_reviews,
    })
}

fn title(card: ElementRef<'_>, selectors: &CompiledSelectors) -> Result<String, ExtractError> {
    first(card, &selectors.title)
        .map(element_text)
        .filter(|title| !title.is_empty())
        .ok_or(ExtractError::MissingRequiredField { field: "title" })
}

fn price(card: ElementRef<'_>, selectors: &CompiledSelectors) -> Result<f64, ExtractError> {
    match PriceMarker::resolve(card, selectors) {
        PriceMarker::Expected => Ok(0.0),
        PriceMarker::OnAction(card) => match first(card, &selectors.price_discounted) {
            Some(node) => parse_price(&element_text(node)),
            None => Err(ExtractError::parse(
                "price",
                "",
                "card is on action but has no discounted price",
            )),
        },
        PriceMarker::Standard(node) => parse_price(&element_text(node)),
        PriceMarker::Unmatched => Err(ExtractError::parse(
            "price",
            "",
            "no known price markup on card",
        )),
    }
}

/// Parse a listed price such as `"12 499 грн"`
pub fn parse_price(text: &str) -> Result<f64, ExtractError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let number = compact.strip_suffix(CURRENCY_SUFFIX).unwrap_or(&compact);

    let value: f64 = number
        .parse()
        .map_err(|e| ExtractError::parse("price", text, e))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ExtractError::parse(
            "price",
            text,
            "price must be a non-negative number",
        ));
    }
    Ok(value)
}

fn rating(card: ElementRef<'_>, selectors: &CompiledSelectors) -> Result<u8, ExtractError> {
    let node = first(card, &selectors.rating)
        .ok_or_else(|| ExtractError::parse("rating", "", "rating element not found"))?;
    let style = node
        .value()
        .attr("style")
        .ok_or_else(|| ExtractError::parse("rating", "", "rating element has no style"))?;
    let percent = percentage_from_style(style)?;
    rating_from_percent(percent)
}

/// Read the percentage out of a style such as `"width: 80%"`
pub fn percentage_from_style(style: &str) -> Result<f64, ExtractError> {
    let captures = PERCENT_RE
        .captures(style)
        .ok_or_else(|| ExtractError::parse("rating", style, "no percentage in style"))?;
    captures[1]
        .replace(',', ".")
        .parse()
        .map_err(|e| ExtractError::parse("rating", style, e))
}

/// Convert a 0..=100 percentage to the 0..=4 star scale
pub fn rating_from_percent(percent: f64) -> Result<u8, ExtractError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(ExtractError::parse(
            "rating",
            percent.to_string(),
            "percentage outside 0..=100",
        ));
    }
    Ok((percent / 25.0).floor() as u8)
}

fn num_of_reviews(
    card: ElementRef<'_>,
    selectors: &CompiledSelectors,
) -> Result<u32, ExtractError> {
    match Reviews::resolve(card, selectors) {
        Reviews::Count(node) => {
            let text = element_text(node);
            text.parse()
                .map_err(|e| ExtractError::parse("num_of_reviews", text.as_str(), e))
        }
        Reviews::Absent => Ok(0),
    }
}

fn first<'a>(card: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    card.select(selector).next()
}
