//! Vehicle make/model lookup for populating the UI.
//!
//! The pricing engine never consults these sources; make and model only feed
//! the body-type heuristic as opaque strings.

mod builtin;
mod vpic;

pub use builtin::StaticVehicleSource;
pub use vpic::VpicVehicleSource;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::VehiclesConfig;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("Make '{0}' not found")]
    UnknownMake(String),

    #[error("Vehicle data source error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for VehicleError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

#[async_trait]
pub trait VehicleSource: Send + Sync {
    /// Short identifier for logs (`static`, `vpic`)
    fn name(&self) -> &'static str;

    /// All known makes, sorted
    async fn makes(&self) -> Result<Vec<String>, VehicleError>;

    /// Models for an exact make name, sorted
    async fn models(&self, make: &str) -> Result<Vec<String>, VehicleError>;
}

/// Build the configured vehicle source
pub fn from_config(cfg: &VehiclesConfig) -> anyhow::Result<Arc<dyn VehicleSource>> {
    match cfg.provider.as_str() {
        "static" => Ok(match &cfg.makes {
            Some(makes) => Arc::new(StaticVehicleSource::from_map(makes.clone())),
            None => Arc::new(StaticVehicleSource::builtin()),
        }),
        "vpic" => Ok(Arc::new(VpicVehicleSource::new(
            &cfg.vpic_base_url,
            &cfg.vehicle_type,
            Duration::from_secs(cfg.timeout_seconds),
        )?)),
        other => anyhow::bail!("Unknown vehicle provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_defaults_to_builtin_table() {
        let source = from_config(&VehiclesConfig::default()).unwrap();
        assert_eq!(source.name(), "static");
        assert!(source.makes().await.unwrap().contains(&"Toyota".to_string()));
    }

    #[test]
    fn test_from_config_rejects_unknown_provider() {
        let cfg = VehiclesConfig {
            provider: "carfax".to_string(),
            ..VehiclesConfig::default()
        };
        assert!(from_config(&cfg).is_err());
    }
}
