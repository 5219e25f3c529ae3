use anyhow::Result;
use colored::Colorize;
use shop_estimate::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the serve command
///
/// Loads configuration, initializes logging from it and runs the server
/// until a shutdown signal arrives.
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    println!(
        "{} {}:{}",
        "Starting shop-estimate on".green(),
        cfg.server.host,
        cfg.server.port
    );
    info!("Loaded configuration from {}", config_path.display());

    server::start_server(cfg).await
}
