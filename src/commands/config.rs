use anyhow::Result;
use colored::Colorize;
use shop_estimate::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration (file plus environment overrides)
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", render(&cfg)?);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Server: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Catalog: {}", catalog_source(&cfg));
    println!(
        "  Default Labor Rate: {:.2} {}",
        cfg.pricing.default_labor_rate, cfg.pricing.currency
    );
    println!("  Vehicle Provider: {}", cfg.vehicles.provider);

    info!("Configuration validation successful");
    Ok(())
}

fn render(cfg: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}

fn catalog_source(cfg: &Config) -> String {
    match (&cfg.catalog.path, &cfg.catalog.url) {
        (Some(path), _) => format!("file {}", path),
        (None, Some(url)) => format!("url {}", url),
        (None, None) => "(none)".to_string(),
    }
}
