use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Configuration for a catalog run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL of the first listing page
    pub catalog_url: String,

    /// Query parameter carrying the page number for pages 2 and up
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// How pages after the first are fetched
    #[serde(default)]
    pub concurrency: ConcurrencyPolicy,

    /// What happens when a single product card cannot be extracted
    #[serde(default)]
    pub on_node_error: NodeErrorPolicy,

    /// Skip pages after the first that fail to fetch instead of aborting
    #[serde(default)]
    pub isolate_pages: bool,

    /// Dataset path
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Whether the dataset is replaced or extended
    #[serde(default)]
    pub write_mode: WriteMode,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// CSS selectors describing the listing markup
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Scheduling of page fetches after the first page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// One page at a time, in page order
    Sequential,
    /// At most `limit` fetches in flight
    Bounded {
        #[serde(default = "default_max_concurrency")]
        limit: usize,
    },
}

impl Default for ConcurrencyPolicy {
    fn default() -> Self {
        ConcurrencyPolicy::Bounded {
            limit: default_max_concurrency(),
        }
    }
}

/// Handling of a product card whose extraction fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeErrorPolicy {
    /// Drop the card, record the failure and continue
    #[default]
    Skip,
    /// Drop every record of the page the card is on
    AbortPage,
    /// Fail the whole run
    AbortRun,
}

/// How the dataset is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace any existing dataset
    #[default]
    Overwrite,
    /// Add the new records after the existing ones
    Append,
}

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra attempts on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay of the exponential back-off
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// CSS selectors for the parts of a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub product_card: String,
    pub title: String,
    /// Marks a card whose price is expected or not set
    pub price_expected: String,
    /// Marks a card with a discounted price
    pub price_action: String,
    /// Discounted price inside an on-action card
    pub price_discounted: String,
    pub price_standard: String,
    /// Element whose `style` carries the rating percentage
    pub rating: String,
    pub in_store: String,
    pub not_in_store: String,
    /// Text the in-store marker must carry, when set
    pub in_store_label: Option<String>,
    pub reviews: String,
    pub pagination: String,
    pub pagination_item: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_card: ".product-card".to_string(),
            title: ".product__title".to_string(),
            price_expected: ".product__price-expected, .product__price.none".to_string(),
            price_action: ".product__price-action".to_string(),
            price_discounted: ".new".to_string(),
            price_standard: ".product__price".to_string(),
            rating: ".rating-stars-i".to_string(),
            in_store: ".presence-in-store".to_string(),
            not_in_store: ".product-presence.presence-not-in-store".to_string(),
            in_store_label: None,
            reviews: ".product-reviews".to_string(),
            pagination: ".paginate__block".to_string(),
            pagination_item: "li".to_string(),
        }
    }
}

/// Built-in catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPreset {
    /// Effect pedals
    Pedals,
    /// Guitar combo amplifiers
    Amplifiers,
}

/// Base URL of the built-in catalogs
pub const BASE_URL: &str = "https://jam.ua/";

impl CatalogPreset {
    /// Look a preset up by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pedals" | "effect_pedals" => Some(CatalogPreset::Pedals),
            "amplifiers" | "amps" | "guitar_combo" => Some(CatalogPreset::Amplifiers),
            _ => None,
        }
    }

    /// Build the configuration of this catalog
    pub fn config(self) -> CatalogConfig {
        match self {
            CatalogPreset::Pedals => {
                let mut config = CatalogConfig::new(&format!("{BASE_URL}ua/effect_pedals"));
                config.output = PathBuf::from("pedals.csv");
                config
            }
            CatalogPreset::Amplifiers => {
                let mut config = CatalogConfig::new(&format!("{BASE_URL}ua/guitar_combo"));
                config.output = PathBuf::from("amplifiers.csv");
                config.selectors.in_store_label = Some("В наявності".to_string());
                config
            }
        }
    }
}

impl CatalogConfig {
    /// Create a new configuration with default values
    pub fn new(catalog_url: &str) -> Self {
        Self {
            catalog_url: catalog_url.to_string(),
            page_param: default_page_param(),
            concurrency: ConcurrencyPolicy::default(),
            on_node_error: NodeErrorPolicy::default(),
            isolate_pages: false,
            output: default_output(),
            write_mode: WriteMode::default(),
            http: HttpConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could work with
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.page_param.trim().is_empty() {
            return Err(CatalogError::Config("page_param must not be empty".into()));
        }
        if let ConcurrencyPolicy::Bounded { limit: 0 } = self.concurrency {
            return Err(CatalogError::Config(
                "concurrency limit must be at least 1".into(),
            ));
        }
        url::Url::parse(&self.catalog_url)?;
        Ok(())
    }
}

/// Default value for page_param
fn default_page_param() -> String {
    "list".to_string()
}

/// Default value for the bounded concurrency limit
fn default_max_concurrency() -> usize {
    4
}

/// Default dataset path
fn default_output() -> PathBuf {
    PathBuf::from("products.csv")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}
