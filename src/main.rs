use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use shop_estimate::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    // The server configures tracing from its config file; other commands only log warnings
    if !matches!(command, cli::Commands::Serve) {
        init_tracing("warn", "text");
    }

    match command {
        cli::Commands::Serve => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Check => {
            commands::check::execute(&args.config).await?;
        }
        cli::Commands::Quote(quote) => {
            commands::quote::execute(&args.config, quote).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("shop-estimate v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
