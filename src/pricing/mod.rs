pub mod calculator;
pub mod models;
pub mod multipliers;

pub use calculator::{round_cents, EstimateCalculator, EstimateError, FALLBACK_LABOR_RATE};
pub use models::{AppliedMultipliers, EstimateRequest, EstimateResult, PricingMode, VehicleInfo};
pub use multipliers::{
    classify_body_type, regional_multiplier, vehicle_multiplier, year_factor, BodyType,
    VehicleMultiplier,
};
