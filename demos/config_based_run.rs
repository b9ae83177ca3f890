use catalog_pages::{Catalog, CatalogConfig, ConcurrencyPolicy};
use clap::Parser;
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config_file: String,

    /// Maximum concurrency level
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Collect only, leave the dataset untouched
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();

    println!("Loading configuration from file: {}", args.config_file);
    let config = CatalogConfig::from_file(&args.config_file)?;

    println!("Catalog configuration:");
    println!("  Listing URL: {}", config.catalog_url);
    println!("  Page parameter: {}", config.page_param);
    match config.concurrency {
        ConcurrencyPolicy::Sequential => println!("  Concurrency: sequential"),
        ConcurrencyPolicy::Bounded { limit } => println!("  Concurrency: up to {} pages", limit),
    }
    println!("  Node errors: {:?}", config.on_node_error);
    println!("  Output: {} ({:?})", config.output.display(), config.write_mode);

    let mut catalog = Catalog::new(config);
    if let Some(concurrency) = args.concurrency {
        println!("Overriding max concurrency: {}", concurrency);
        catalog = catalog.with_max_concurrency(concurrency);
    }
    catalog.config().validate()?;

    let start_time = std::time::Instant::now();
    let run = if args.dry_run {
        catalog.collect().await?
    } else {
        catalog.run().await?
    };

    for failure in &run.failures {
        println!("Skipped: {}", failure);
    }
    println!(
        "Collected {} products from {} pages in {:.2} seconds.",
        run.products.len(),
        run.pages,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
