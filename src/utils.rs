use scraper::ElementRef;
use url::Url;

/// Text content of an element with whitespace runs collapsed to single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL of a listing page; the first page is the catalog URL itself
pub fn page_url(catalog_url: &Url, page_param: &str, page: u32) -> Url {
    let mut url = catalog_url.clone();
    if page > 1 {
        url.query_pairs_mut()
            .append_pair(page_param, &page.to_string());
    }
    url
}
