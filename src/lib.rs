// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod parsers;
pub mod results;
pub mod sink;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CatalogConfig, CatalogPreset, ConcurrencyPolicy, NodeErrorPolicy, WriteMode};
pub use error::CatalogError;
pub use results::{CatalogRun, Product};
pub use sink::CsvSink;

use crawlers::{HttpFetcher, PageFetcher, Traversal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main builder for scraping a catalog into a dataset
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
}

impl Catalog {
    /// Create a new Catalog builder from a configuration
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Create a builder for one of the built-in catalogs
    pub fn preset(preset: CatalogPreset) -> Self {
        Self::new(preset.config())
    }

    /// Load configuration from a file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Ok(Self::new(CatalogConfig::from_file(path)?))
    }

    /// Load configuration from a JSON string
    pub fn from_config_str(config_str: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(CatalogConfig::from_json(config_str)?))
    }

    /// Fetch at most `max_concurrency` pages at a time
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.concurrency = ConcurrencyPolicy::Bounded {
            limit: max_concurrency,
        };
        self
    }

    /// Fetch one page at a time
    pub fn sequential(mut self) -> Self {
        self.config.concurrency = ConcurrencyPolicy::Sequential;
        self
    }

    /// Set what happens when a product card cannot be extracted
    pub fn with_node_error_policy(mut self, policy: NodeErrorPolicy) -> Self {
        self.config.on_node_error = policy;
        self
    }

    /// Skip pages after the first that fail to fetch
    pub fn with_page_isolation(mut self, isolate_pages: bool) -> Self {
        self.config.isolate_pages = isolate_pages;
        self
    }

    /// Set the dataset path
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = output.into();
        self
    }

    /// Set whether the dataset is replaced or extended
    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.config.write_mode = write_mode;
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Walk every listing page over HTTP and return the extracted products
    pub async fn collect(&self) -> Result<CatalogRun, CatalogError> {
        let fetcher = Arc::new(HttpFetcher::new(&self.config.http)?);
        self.collect_with(fetcher).await
    }

    /// Walk every listing page with the given fetcher
    pub async fn collect_with(
        &self,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<CatalogRun, CatalogError> {
        Traversal::new(&self.config, fetcher)?.traverse_all().await
    }

    /// Collect over HTTP and write the dataset
    pub async fn run(&self) -> Result<CatalogRun, CatalogError> {
        let fetcher = Arc::new(HttpFetcher::new(&self.config.http)?);
        self.run_with(fetcher).await
    }

    /// Collect with the given fetcher and write the dataset
    ///
    /// Nothing is written unless the whole traversal succeeds.
    pub async fn run_with(
        &self,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<CatalogRun, CatalogError> {
        let run = self.collect_with(fetcher).await?;
        CsvSink::new(&self.config.output).persist(&run.products, self.config.write_mode)?;
        Ok(run)
    }
}
