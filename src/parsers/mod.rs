pub mod pagination;
pub mod product;

#[cfg(test)]
mod tests;

use crate::config::SelectorConfig;
use crate::error::{CatalogError, ExtractError};
use crate::results::Product;
use scraper::{ElementRef, Html, Selector};

/// Selectors of a [`SelectorConfig`], compiled once per run
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub product_card: Selector,
    pub title: Selector,
    pub price_expected: Selector,
    pub price_action: Selector,
    pub price_discounted: Selector,
    pub price_standard: Selector,
    pub rating: Selector,
    pub in_store: Selector,
    pub not_in_store: Selector,
    pub in_store_label: Option<String>,
    pub reviews: Selector,
    pub pagination: Selector,
    pub pagination_item: Selector,
}

impl CompiledSelectors {
    /// Compile every selector, failing on the first invalid one
    pub fn compile(config: &SelectorConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            product_card: compile("product_card", &config.product_card)?,
            title: compile("title", &config.title)?,
            price_expected: compile("price_expected", &config.price_expected)?,
            price_action: compile("price_action", &config.price_action)?,
            price_discounted: compile("price_discounted", &config.price_discounted)?,
            price_standard: compile("price_standard", &config.price_standard)?,
            rating: compile("rating", &config.rating)?,
            in_store: compile("in_store", &config.in_store)?,
            not_in_store: compile("not_in_store", &config.not_in_store)?,
            in_store_label: config.in_store_label.clone(),
            reviews: compile("reviews", &config.reviews)?,
            pagination: compile("pagination", &config.pagination)?,
            pagination_item: compile("pagination_item", &config.pagination_item)?,
        })
    }
}

impl Default for CompiledSelectors {
    fn default() -> Self {
        Self::compile(&SelectorConfig::default()).expect("Default selectors should be valid")
    }
}

fn compile(role: &'static str, selector: &str) -> Result<Selector, CatalogError> {
    Selector::parse(selector).map_err(|e| CatalogError::InvalidSelector {
        role,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// A parsed listing page
pub struct ListingPage {
    doc: Html,
}

impl ListingPage {
    /// Parse raw markup into a listing page
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    /// Number of pages announced by the pagination block
    pub fn page_count(&self, selectors: &CompiledSelectors) -> Result<u32, CatalogError> {
        Ok(pagination::resolve(&self.doc, selectors)?)
    }

    /// Product cards in document order
    pub fn product_cards<'a>(
        &'a self,
        selectors: &'a CompiledSelectors,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.doc.select(&selectors.product_card)
    }

    /// Extract every product card, in document order
    pub fn extract_products(
        &self,
        selectors: &CompiledSelectors,
    ) -> Vec<Result<Product, ExtractError>> {
        let results = self
            .product_cards(selectors)
            .map(|card| product::extract(card, selectors))
            .collect::<Vec<_>>();
        ::log::debug!("Listing page has {} product cards", results.len());
        results
    }
}
