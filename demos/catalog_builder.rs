use catalog_pages::{Catalog, CatalogPreset, NodeErrorPolicy, WriteMode};
use clap::Parser;
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in catalog to scrape (pedals, amplifiers)
    #[arg(short, long, default_value = "pedals")]
    preset: String,

    /// Dataset path
    #[arg(short, long)]
    output: Option<String>,

    /// Maximum concurrency level
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Append to the dataset instead of replacing it
    #[arg(short, long)]
    append: bool,

    /// Abort the whole run on the first malformed product card
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();

    let preset = CatalogPreset::from_name(&args.preset)
        .ok_or_else(|| format!("unknown preset: {}", args.preset))?;
    let mut catalog = Catalog::preset(preset);
    println!("Starting catalog run for URL: {}", catalog.config().catalog_url);

    if let Some(output) = args.output {
        println!("Writing to: {}", output);
        catalog = catalog.with_output(output);
    }

    if let Some(concurrency) = args.concurrency {
        println!("Overriding max concurrency: {}", concurrency);
        catalog = catalog.with_max_concurrency(concurrency);
    }

    if args.append {
        catalog = catalog.with_write_mode(WriteMode::Append);
    }

    if args.strict {
        catalog = catalog.with_node_error_policy(NodeErrorPolicy::AbortRun);
    }

    let start_time = std::time::Instant::now();
    let run = catalog.run().await?;

    println!(
        "Run complete. Saved {} products ({} skipped) from {} pages in {:.2} seconds.",
        run.products.len(),
        run.failures.len(),
        run.pages,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
