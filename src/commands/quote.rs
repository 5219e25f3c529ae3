use anyhow::Result;
use colored::Colorize;
use shop_estimate::config;
use shop_estimate::pricing::{
    EstimateCalculator, EstimateRequest, EstimateResult, PricingMode, VehicleInfo,
};
use shop_estimate::server;
use std::path::Path;

use crate::cli::QuoteArgs;

/// Execute the quote command
///
/// Loads the configured catalog and prices one service with the same
/// calculator the HTTP API uses.
pub async fn execute(config_path: &Path, args: QuoteArgs) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let cache = server::build_catalog_cache(&cfg.catalog)?;
    let index = cache.index().await?;

    let calculator = EstimateCalculator::new(cfg.pricing.default_labor_rate);
    let estimate = calculator.quote(&index, &to_request(args.clone()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print_estimate(&estimate, &cfg.pricing.currency);
    }

    Ok(())
}

fn to_request(args: QuoteArgs) -> EstimateRequest {
    EstimateRequest {
        category_key: args.category,
        service_code: args.service,
        zip: args.zip,
        vehicle: VehicleInfo {
            year: args.year,
            make: args.make,
            model: args.model,
        },
        pricing_mode: if args.mode == "flat" {
            PricingMode::Flat
        } else {
            PricingMode::Hourly
        },
        labor_rate: args.labor_rate,
        parts_price: args.parts_price,
    }
}

fn print_estimate(estimate: &EstimateResult, currency: &str) {
    println!(
        "{} {} {}",
        estimate.service_name.bold(),
        "in".dimmed(),
        estimate.category_name
    );
    println!();
    println!("  {}: {}", "Pricing".cyan(), estimate.pricing_mode);
    if let Some(rate) = estimate.labor_rate {
        println!("  {}: {:.2} {}/h", "Labor Rate".cyan(), rate, currency);
    }
    println!(
        "  {}: year {:.2} × {:?} {:.2} × region {:.2} = {:.4}",
        "Multipliers".cyan(),
        estimate.multipliers.vehicle.year_factor,
        estimate.multipliers.vehicle.body_type,
        estimate.multipliers.vehicle.body_factor,
        estimate.multipliers.regional,
        estimate.multipliers.combined
    );
    println!(
        "  {}: {:.2} - {:.2} {}",
        "Labor".cyan(),
        estimate.labor_low,
        estimate.labor_high,
        currency
    );
    println!("  {}: {:.2} {}", "Parts".cyan(), estimate.parts_price, currency);
    println!(
        "  {}: {} {}",
        "Total".cyan(),
        format!("{:.2} - {:.2}", estimate.total_low, estimate.total_high).green().bold(),
        currency
    );
}
