use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shop-estimate", version, about = "Repair-shop price estimate service")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the estimate server (default)
    Serve,

    /// Validate configuration and load the service catalog
    Check,

    /// Price a single service from the command line
    Quote(QuoteArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Category key, e.g. `brakes`
    pub category: String,

    /// Service code within the category, e.g. `front_pads`
    pub service: String,

    /// ZIP code for regional pricing
    #[arg(long, default_value = "")]
    pub zip: String,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, default_value = "")]
    pub make: String,

    #[arg(long, default_value = "")]
    pub model: String,

    /// Pricing mode: flat or hourly
    #[arg(long, default_value = "hourly", value_parser = ["flat", "hourly"])]
    pub mode: String,

    /// Hourly labor rate override
    #[arg(long)]
    pub labor_rate: Option<f64>,

    #[arg(long)]
    pub parts_price: Option<f64>,

    /// Print the estimate as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["shop-estimate"]).unwrap();
        assert!(matches!(cli.get_command(), Commands::Serve));
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_cli_parsing_quote() {
        let args = [
            "shop-estimate",
            "--config",
            "shop.toml",
            "quote",
            "brakes",
            "front_pads",
            "--zip",
            "92646",
            "--year",
            "2021",
            "--model",
            "F-150",
            "--mode",
            "flat",
            "--parts-price",
            "40",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, PathBuf::from("shop.toml"));

        match cli.get_command() {
            Commands::Quote(quote) => {
                assert_eq!(quote.category, "brakes");
                assert_eq!(quote.service, "front_pads");
                assert_eq!(quote.year, Some(2021));
                assert_eq!(quote.mode, "flat");
                assert_eq!(quote.parts_price, Some(40.0));
                assert!(!quote.json);
            }
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let args = ["shop-estimate", "quote", "brakes", "pads", "--mode", "weekly"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let cli = Cli::try_parse_from(["shop-estimate", "config", "show"]).unwrap();

        match cli.get_command() {
            Commands::Config { action } => assert!(matches!(action, ConfigCommands::Show)),
            _ => panic!("Expected Config command"),
        }
    }
}
