use catalog_pages::CatalogError;
use clap::Parser;

mod args;
mod logging;
use args::{Args, build_catalog};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = logging::init(args.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let catalog = match build_catalog(&args) {
        Ok(catalog) => catalog,
        Err(e) => fail(&e),
    };

    let config = catalog.config();
    ::log::info!("Starting catalog run for: {}", config.catalog_url);
    ::log::debug!("Configuration: {:?}", config);

    let start_time = std::time::Instant::now();
    match catalog.run().await {
        Ok(run) => {
            for failure in &run.failures {
                ::log::warn!("{}", failure);
            }
            ::log::info!(
                "Saved {} products to {} ({:?} mode)",
                run.products.len(),
                config.output.display(),
                config.write_mode
            );
            ::log::info!(
                "Program executes in {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
        }
        Err(e) => fail(&e),
    }
}

/// Report a failed run and exit
fn fail(error: &CatalogError) -> ! {
    ::log::error!("{}: {}", error.kind(), error);
    std::process::exit(1);
}
