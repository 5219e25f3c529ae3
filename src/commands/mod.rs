//! Command implementations for the CLI
//!
//! - start: Start the estimate server
//! - check: Validate configuration and load the catalog
//! - quote: Price one service from the command line
//! - config: Configuration display and validation

pub mod check;
pub mod config;
pub mod quote;
pub mod start;
