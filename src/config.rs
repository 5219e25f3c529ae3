use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub vehicles: VehiclesConfig,
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Where the service catalog comes from and how often it is re-checked.
///
/// Exactly one of `path` or `url` must be set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Local JSON file; reloaded when its modification time or size changes
    #[serde(default)]
    pub path: Option<String>,

    /// Remote JSON document; reloaded when its content hash changes
    #[serde(default)]
    pub url: Option<String>,

    /// Per-request timeout for the remote catalog (default: 10)
    #[serde(default = "default_catalog_timeout")]
    pub timeout_seconds: u64,

    /// Retries after the first failed remote fetch (default: 2)
    #[serde(default = "default_catalog_retries")]
    pub max_retries: u32,

    /// Background staleness check interval, 0 disables the poller (default: 30)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: Some(default_catalog_path()),
            url: None,
            timeout_seconds: default_catalog_timeout(),
            max_retries: default_catalog_retries(),
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Hourly labor rate used when neither the request nor the catalog supplies one
    #[serde(default = "default_labor_rate")]
    pub default_labor_rate: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_labor_rate: default_labor_rate(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehiclesConfig {
    /// `static` (built-in or configured table) or `vpic` (NHTSA vehicle API)
    #[serde(default = "default_vehicle_provider")]
    pub provider: String,

    #[serde(default = "default_vpic_base_url")]
    pub vpic_base_url: String,

    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,

    #[serde(default = "default_vehicle_timeout")]
    pub timeout_seconds: u64,

    /// Replaces the built-in make -> models table when set
    #[serde(default)]
    pub makes: Option<HashMap<String, Vec<String>>>,
}

impl Default for VehiclesConfig {
    fn default() -> Self {
        Self {
            provider: default_vehicle_provider(),
            vpic_base_url: default_vpic_base_url(),
            vehicle_type: default_vehicle_type(),
            timeout_seconds: default_vehicle_timeout(),
            makes: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticFilesConfig {
    #[serde(default = "default_static_dir")]
    pub dir: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_catalog_path() -> String {
    "data/services_catalog.json".to_string()
}

fn default_catalog_timeout() -> u64 {
    10
}

fn default_catalog_retries() -> u32 {
    2
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_labor_rate() -> f64 {
    90.0
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_vehicle_provider() -> String {
    "static".to_string()
}

fn default_vpic_base_url() -> String {
    "https://vpic.nhtsa.dot.gov/api/vehicles".to_string()
}

fn default_vehicle_type() -> String {
    "car".to_string()
}

fn default_vehicle_timeout() -> u64 {
    10
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Load configuration from `path` with `SHOP_ESTIMATE__SECTION__KEY` overrides.
///
/// A missing file is not an error: every section has defaults, so the
/// environment alone can configure the service.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("SHOP_ESTIMATE").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be greater than 0");
    }

    match (&cfg.catalog.path, &cfg.catalog.url) {
        (Some(_), Some(_)) => anyhow::bail!("Set either catalog.path or catalog.url, not both"),
        (None, None) => anyhow::bail!("One of catalog.path or catalog.url must be configured"),
        (Some(path), None) if path.trim().is_empty() => {
            anyhow::bail!("catalog.path cannot be empty")
        }
        (None, Some(url)) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            anyhow::bail!("catalog.url must be an http(s) URL: {}", url)
        }
        _ => {}
    }

    if cfg.catalog.timeout_seconds == 0 {
        anyhow::bail!("catalog.timeout_seconds must be greater than 0");
    }

    if !(cfg.pricing.default_labor_rate.is_finite() && cfg.pricing.default_labor_rate > 0.0) {
        anyhow::bail!(
            "pricing.default_labor_rate must be a positive number, got {}",
            cfg.pricing.default_labor_rate
        );
    }

    if cfg.pricing.currency.trim().is_empty() {
        anyhow::bail!("pricing.currency cannot be empty");
    }

    match cfg.vehicles.provider.as_str() {
        "static" => {
            if let Some(makes) = &cfg.vehicles.makes {
                if makes.is_empty() {
                    anyhow::bail!("vehicles.makes must list at least one make when set");
                }
                for make in makes.keys() {
                    if make.trim().is_empty() {
                        anyhow::bail!("vehicles.makes contains an empty make name");
                    }
                }
            }
        }
        "vpic" => {
            if cfg.vehicles.vpic_base_url.trim().is_empty() {
                anyhow::bail!("vehicles.vpic_base_url cannot be empty when provider is 'vpic'");
            }
        }
        other => anyhow::bail!("Invalid vehicles.provider: {} (expected 'static' or 'vpic')", other),
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("metrics.endpoint must start with '/'");
    }

    Ok(())
}
