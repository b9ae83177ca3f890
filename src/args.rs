use catalog_pages::{
    Catalog, CatalogConfig, CatalogError, CatalogPreset, NodeErrorPolicy, WriteMode,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-pages")]
#[command(about = "Scrapes a paginated product catalog into a CSV dataset")]
#[command(version)]
pub struct Args {
    /// Catalog to scrape: a preset (pedals, amplifiers) or a listing URL
    #[arg(default_value = "pedals")]
    pub catalog: String,

    /// JSON configuration file (replaces the positional catalog)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dataset path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the dataset or append to it
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Number of pages fetched concurrently
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Fetch one page at a time
    #[arg(long, conflicts_with = "concurrency")]
    pub sequential: bool,

    /// What to do with a product card that cannot be extracted
    #[arg(long, value_enum)]
    pub on_node_error: Option<NodeErrorArg>,

    /// Skip pages after the first that fail to fetch
    #[arg(long)]
    pub isolate_pages: bool,

    /// Also append log lines to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Overwrite,
    Append,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum NodeErrorArg {
    Skip,
    AbortPage,
    AbortRun,
}

/// Build the catalog run described by the command line
pub fn build_catalog(args: &Args) -> Result<Catalog, CatalogError> {
    let mut catalog = if let Some(path) = &args.config {
        Catalog::from_config_file(path)?
    } else if let Some(preset) = CatalogPreset::from_name(&args.catalog) {
        Catalog::preset(preset)
    } else {
        Catalog::new(CatalogConfig::new(&args.catalog))
    };

    if let Some(output) = &args.output {
        catalog = catalog.with_output(output);
    }
    if let Some(mode) = args.mode {
        catalog = catalog.with_write_mode(match mode {
            ModeArg::Overwrite => WriteMode::Overwrite,
            ModeArg::Append => WriteMode::Append,
        });
    }
    if let Some(concurrency) = args.concurrency {
        catalog = catalog.with_max_concurrency(concurrency);
    }
    if args.sequential {
        catalog = catalog.sequential();
    }
    if let Some(policy) = args.on_node_error {
        catalog = catalog.with_node_error_policy(match policy {
            NodeErrorArg::Skip => NodeErrorPolicy::Skip,
            NodeErrorArg::AbortPage => NodeErrorPolicy::AbortPage,
            NodeErrorArg::AbortRun => NodeErrorPolicy::AbortRun,
        });
    }
    if args.isolate_pages {
        catalog = catalog.with_page_isolation(true);
    }

    catalog.config().validate()?;
    Ok(catalog)
}
