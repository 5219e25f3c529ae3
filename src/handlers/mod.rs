pub mod catalog;
pub mod estimate;
pub mod health;
pub mod metrics_handler;
pub mod vehicles;

use std::sync::Arc;

use crate::catalog::CatalogCache;
use crate::config::Config;
use crate::pricing::EstimateCalculator;
use crate::vehicles::VehicleSource;

/// Shared state for the API routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogCache>,
    pub calculator: Arc<EstimateCalculator>,
    pub vehicles: Arc<dyn VehicleSource>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<CatalogCache>, vehicles: Arc<dyn VehicleSource>) -> Self {
        let calculator = EstimateCalculator::new(config.pricing.default_labor_rate);
        Self {
            config: Arc::new(config),
            catalog,
            calculator: Arc::new(calculator),
            vehicles,
        }
    }
}
