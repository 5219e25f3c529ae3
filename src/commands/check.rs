use anyhow::{Context, Result};
use colored::Colorize;
use shop_estimate::{config, server, vehicles};
use std::path::Path;
use tracing::info;

/// Execute the check command
///
/// Validates the configuration and loads the catalog once without starting
/// the server, so a broken catalog is caught before deployment.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Checking configuration...".yellow());
    let cfg = config::load_config(config_path)?;
    println!("{}", "✓ Configuration is valid".green());

    let vehicle_source = vehicles::from_config(&cfg.vehicles)?;

    let cache = server::build_catalog_cache(&cfg.catalog)?;
    println!("{} {}", "Loading catalog from".yellow(), cache.source_description());

    let snapshot = cache
        .refresh_if_stale()
        .await
        .with_context(|| format!("Catalog check failed for {}", cache.source_description()))?;
    let index = &snapshot.index;

    println!("{}", "✓ Catalog loaded".green());
    println!();
    println!("{}", "Catalog Summary:".bold());
    println!("  {}: {}", "Version".cyan(), snapshot.version);
    println!("  {}: {}", "Categories".cyan(), index.categories().len());
    println!("  {}: {}", "Services".cyan(), index.service_count());
    match index.default_labor_rate() {
        Some(rate) => println!("  {}: {:.2} (catalog)", "Labor Rate".cyan(), rate),
        None => println!(
            "  {}: {:.2} (configured fallback)",
            "Labor Rate".cyan(),
            cfg.pricing.default_labor_rate
        ),
    }
    println!();

    for category in index.categories() {
        println!(
            "    {} {} ({} services)",
            category.key,
            format!("[{}]", category.name).dimmed(),
            category.services().len()
        );
    }
    println!();

    println!("  {}: {}", "Vehicle Data".cyan(), vehicle_source.name());
    println!("  {}: {}", "Static Files".cyan(), cfg.static_files.dir);
    println!(
        "  {}: {}",
        "Metrics".cyan(),
        if cfg.metrics.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        }
    );

    info!("Check completed successfully");
    Ok(())
}
