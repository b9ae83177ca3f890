use crate::config::{CatalogConfig, ConcurrencyPolicy, NodeErrorPolicy};
use crate::crawlers::PageFetcher;
use crate::error::{CatalogError, FetchError};
use crate::parsers::{CompiledSelectors, ListingPage};
use crate::results::{CatalogRun, Failure, PageResult};
use crate::utils::page_url;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Walks every listing page of a catalog and extracts its products
///
/// The first page is always fetched on its own since it announces the page
/// count. Later pages are fetched according to the [`ConcurrencyPolicy`];
/// markup is parsed and extracted on the calling task either way.
pub struct Traversal {
    fetcher: Arc<dyn PageFetcher>,
    catalog_url: Url,
    page_param: String,
    concurrency: ConcurrencyPolicy,
    on_node_error: NodeErrorPolicy,
    isolate_pages: bool,
    selectors: CompiledSelectors,
}

impl Traversal {
    /// Create a traversal for the configured catalog
    pub fn new(
        config: &CatalogConfig,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, CatalogError> {
        config.validate()?;

        Ok(Self {
            fetcher,
            catalog_url: Url::parse(&config.catalog_url)?,
            page_param: config.page_param.clone(),
            concurrency: config.concurrency,
            on_node_error: config.on_node_error,
            isolate_pages: config.isolate_pages,
            selectors: CompiledSelectors::compile(&config.selectors)?,
        })
    }

    /// Fetch and extract every page, returning products in page order
    pub async fn traverse_all(&self) -> Result<CatalogRun, CatalogError> {
        let started = std::time::Instant::now();
        ::log::info!("Parsing catalog page #1: {}", self.catalog_url);

        let body = self
            .fetcher
            .fetch(&self.page_url(1))
            .await
            .map_err(|source| CatalogError::Fetch { page: 1, source })?;

        let (page_count, first) = {
            let listing = ListingPage::parse(&body);
            let page_count = listing.page_count(&self.selectors)?;
            (page_count, self.extract_page(1, &listing)?)
        };
        ::log::info!("Catalog has {} page(s)", page_count);

        let mut aggregator = Aggregator::new(page_count);
        aggregator.insert(first);

        if page_count > 1 {
            match self.concurrency {
                ConcurrencyPolicy::Sequential => {
                    self.fetch_sequential(page_count, &mut aggregator).await?;
                }
                ConcurrencyPolicy::Bounded { limit } => {
                    self.fetch_bounded(page_count, limit, &mut aggregator).await?;
                }
            }
        }

        let run = aggregator.finish();
        ::log::info!(
            "Collected {} products from {} page(s) in {:.2} seconds ({} failure(s))",
            run.products.len(),
            run.pages,
            started.elapsed().as_secs_f64(),
            run.failures.len()
        );
        Ok(run)
    }

    /// Pages 2..=page_count, one after another
    async fn fetch_sequential(
        &self,
        page_count: u32,
        aggregator: &mut Aggregator,
    ) -> Result<(), CatalogError> {
        for page in 2..=page_count {
            ::log::info!("Parsing catalog page #{}", page);
            let fetched = self.fetcher.fetch(&self.page_url(page)).await;
            aggregator.insert(self.absorb(page, fetched)?);
        }
        Ok(())
    }

    /// Pages 2..=page_count, at most `limit` fetches in flight
    ///
    /// Returning early drops the join set, which aborts outstanding fetches.
    async fn fetch_bounded(
        &self,
        page_count: u32,
        limit: usize,
        aggregator: &mut Aggregator,
    ) -> Result<(), CatalogError> {
        let semaphore = Arc::new(Semaphore::new(limit.max(1)));
        let mut tasks = JoinSet::new();

        for page in 2..=page_count {
            let url = self.page_url(page);
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // Held until the fetch completes; the semaphore is never closed
                let _permit = semaphore.acquire_owned().await;
                ::log::info!("Parsing catalog page #{}", page);
                let fetched = fetcher.fetch(&url).await;
                (page, fetched)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (page, fetched) = joined?;
            ::log::trace!("Page {} fetch completed", page);
            aggregator.insert(self.absorb(page, fetched)?);
        }
        Ok(())
    }

    /// Turn a fetch outcome for a page after the first into a page result
    fn absorb(
        &self,
        page: u32,
        fetched: Result<String, FetchError>,
    ) -> Result<PageResult, CatalogError> {
        match fetched {
            Ok(body) => {
                let listing = ListingPage::parse(&body);
                self.extract_page(page, &listing)
            }
            Err(source) => {
                let error = CatalogError::Fetch { page, source };
                if self.isolate_pages {
                    ::log::warn!("Skipping page {}: {}", page, error);
                    Ok(PageResult::skipped(page, error))
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Extract every product card of a page, applying the node error policy
    fn extract_page(&self, page: u32, listing: &ListingPage) -> Result<PageResult, CatalogError> {
        let mut result = PageResult::new(page);

        let extracted = listing.extract_products(&self.selectors);
        for (index, extracted) in extracted.into_iter().enumerate() {
            let source = match extracted {
                Ok(product) => {
                    result.products.push(product);
                    continue;
                }
                Err(source) => source,
            };

            match self.on_node_error {
                NodeErrorPolicy::Skip => {
                    ::log::warn!("Dropping product #{} on page {}: {}", index, page, source);
                    result.failures.push(Failure::Node {
                        page,
                        index,
                        error: source,
                    });
                }
                NodeErrorPolicy::AbortPage => {
                    let error = CatalogError::Node {
                        page,
                        index,
                        source,
                    };
                    ::log::warn!("Dropping page {}: {}", page, error);
                    return Ok(PageResult::skipped(page, error));
                }
                NodeErrorPolicy::AbortRun => {
                    return Err(CatalogError::Node {
                        page,
                        index,
                        source,
                    });
                }
            }
        }

        ::log::debug!("Page {} yielded {} products", page, result.products.len());
        Ok(result)
    }

    fn page_url(&self, page: u32) -> Url {
        page_url(&self.catalog_url, &self.page_param, page)
    }
}

/// Collects page results and concatenates them in page order
///
/// Pages may be inserted in any order; [`Aggregator::finish`] orders them by
/// page number.
#[derive(Debug, Default)]
pub struct Aggregator {
    page_count: u32,
    pages: BTreeMap<u32, PageResult>,
}

impl Aggregator {
    pub fn new(page_count: u32) -> Self {
        Self {
            page_count,
            pages: BTreeMap::new(),
        }
    }

    /// Add the result of one page
    pub fn insert(&mut self, result: PageResult) {
        let page = result.page;
        if self.pages.insert(page, result).is_some() {
            ::log::warn!("Page {} was aggregated twice, keeping the latest", page);
        }
    }

    /// Concatenate all pages, lowest page number first
    pub fn finish(self) -> CatalogRun {
        let mut run = CatalogRun {
            pages: self.page_count,
            ..CatalogRun::default()
        };
        for (_, page) in self.pages {
            run.products.extend(page.products);
            run.failures.extend(page.failures);
        }
        run
    }
}
