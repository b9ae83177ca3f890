use crate::error::PaginationError;
use crate::parsers::CompiledSelectors;
use crate::utils::element_text;
use scraper::Html;

/// Determine how many listing pages the catalog has
///
/// A page without a pagination block is the only page. Otherwise the
/// second-to-last item of the block holds the last page number; the last
/// item is the "next" control.
pub fn resolve(doc: &Html, selectors: &CompiledSelectors) -> Result<u32, PaginationError> {
    let Some(block) = doc.select(&selectors.pagination).next() else {
        ::log::debug!("No pagination block, assuming a single page");
        return Ok(1);
    };

    let items = block
        .select(&selectors.pagination_item)
        .map(element_text)
        .collect::<Vec<_>>();
    if items.len() < 2 {
        return Err(PaginationError::TooFewItems { found: items.len() });
    }

    let text = &items[items.len() - 2];
    match text.parse::<u32>() {
        Ok(count) if count >= 1 => {
            ::log::debug!("Pagination announces {} pages", count);
            Ok(count)
        }
        _ => Err(PaginationError::NotAPageCount { text: text.clone() }),
    }
}
