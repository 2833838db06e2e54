// src/main.rs
use clap::Parser;
use std::io;

use takeaway_order::adapter::Console;
use takeaway_order::application::usecase::OrderSession;
use takeaway_order::config::{Args, Config};
use takeaway_order::domain::errors::AppResult;
use takeaway_order::domain::models::OrderTerms;

fn main() -> AppResult<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    if let Some(path) = &args.write_config {
        config.to_file(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    // Initialize logging
    config.init_logging()?;
    log::info!("Starting takeaway_order v{}", env!("CARGO_PKG_VERSION"));

    let catalog = config.menu.to_catalog()?;
    let terms = OrderTerms::from_config(&config.shop, &catalog);
    log::debug!(
        "Menu loaded with {} entries, tax rate {}",
        catalog.category_count(),
        terms.tax_rate
    );

    let session = OrderSession::new(catalog, terms);
    let stdin = io::stdin();
    let mut console = Console::new(session, stdin.lock(), io::stdout());
    console.run()?;

    log::info!("Shutting down");
    Ok(())
}
