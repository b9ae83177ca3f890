use crate::error::{CatalogError, ExtractError};
use serde::{Deserialize, Deserializer, Serialize};

/// Column names of a persisted dataset, in the order they are written
pub const COLUMNS: [&str; 5] = [
    "title",
    "price",
    "rating",
    "presence_in_store",
    "num_of_reviews",
];

/// One catalog item extracted from a product card
///
/// Field order is the column order of the persisted dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name as shown on the card
    pub title: String,

    /// Price in the catalog currency, `0.0` when the price is on request
    pub price: f64,

    /// Star rating on a 0..=4 scale
    pub rating: u8,

    /// Whether the item is in stock at the store
    #[serde(deserialize_with = "deserialize_flag")]
    pub presence_in_store: bool,

    /// Number of customer reviews
    pub num_of_reviews: u32,
}

impl Product {
    /// Create a new product record
    pub fn new(
        title: impl Into<String>,
        price: f64,
        rating: u8,
        presence_in_store: bool,
        num_of_reviews: u32,
    ) -> Self {
        Self {
            title: title.into(),
            price,
            rating,
            presence_in_store,
            num_of_reviews,
        }
    }
}

/// Accepts `true`/`false` in any case as well as `1`/`0`
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, found {other:?}"
        ))),
    }
}

/// Something that went wrong during a run without aborting it
#[derive(Debug)]
pub enum Failure {
    /// A product card was dropped
    Node {
        page: u32,
        index: usize,
        error: ExtractError,
    },
    /// A whole page was skipped
    Page { page: u32, error: CatalogError },
}

impl Failure {
    pub fn page(&self) -> u32 {
        match self {
            Failure::Node { page, .. } | Failure::Page { page, .. } => *page,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Node { page, index, error } => {
                write!(f, "page {page}, product #{index} dropped: {error}")
            }
            Failure::Page { page, error } => write!(f, "page {page} skipped: {error}"),
        }
    }
}

/// Extraction output of a single listing page
#[derive(Debug, Default)]
pub struct PageResult {
    pub page: u32,
    pub products: Vec<Product>,
    pub failures: Vec<Failure>,
}

impl PageResult {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// A page that contributed no records
    pub fn skipped(page: u32, error: CatalogError) -> Self {
        Self {
            page,
            products: Vec::new(),
            failures: vec![Failure::Page { page, error }],
        }
    }
}

/// Aggregated outcome of a traversal
#[derive(Debug, Default)]
pub struct CatalogRun {
    /// Records ordered by page number, then by position on the page
    pub products: Vec<Product>,

    /// Dropped cards and skipped pages, in page order
    pub failures: Vec<Failure>,

    /// Number of pages the catalog reported
    pub pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_accepts_foreign_spellings() {
        let data = "title,price,rating,presence_in_store,num_of_reviews\n\
                    A,10.0,3,True,2\n\
                    B,0,0,false,0\n\
                    C,5.5,4,1,1\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows = reader
            .deserialize::<Product>()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].presence_in_store);
        assert!(!rows[1].presence_in_store);
        assert_eq!(rows[1].price, 0.0);
        assert!(rows[2].presence_in_store);
    }

    #[test]
    fn test_flag_rejects_garbage() {
        let data = "title,price,rating,presence_in_store,num_of_reviews\nA,1,1,maybe,0\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row = reader.deserialize::<Product>().next().unwrap();
        assert!(row.is_err());
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::Node {
            page: 2,
            index: 7,
            error: ExtractError::MissingRequiredField { field: "title" },
        };
        assert_eq!(failure.page(), 2);
        assert_eq!(
            failure.to_string(),
            "page 2, product #7 dropped: missing required field `title`"
        );
    }
}
