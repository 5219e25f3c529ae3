use thiserror::Error;
use tracing::debug;

use super::models::{AppliedMultipliers, EstimateRequest, EstimateResult, PricingMode};
use super::multipliers::{regional_multiplier, vehicle_multiplier};
use crate::catalog::{CatalogIndex, LookupError, ResolvedService};

/// Hourly rate used when neither the request nor the catalog supplies one
pub const FALLBACK_LABOR_RATE: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// A numeric input is negative or not a finite number
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    /// Pricing was requested without a resolved service
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl EstimateError {
    /// Request field the error refers to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(*field),
            Self::InvalidSelection(_) => None,
            Self::Lookup(e) => Some(e.field()),
        }
    }
}

/// Calculator for price estimates over a resolved catalog service
#[derive(Debug, Clone)]
pub struct EstimateCalculator {
    fallback_labor_rate: f64,
}

impl Default for EstimateCalculator {
    fn default() -> Self {
        Self::new(FALLBACK_LABOR_RATE)
    }
}

impl EstimateCalculator {
    pub fn new(fallback_labor_rate: f64) -> Self {
        Self { fallback_labor_rate }
    }

    pub fn fallback_labor_rate(&self) -> f64 {
        self.fallback_labor_rate
    }

    /// Resolve the selection against `index` and price it
    pub fn quote(&self, index: &CatalogIndex, request: &EstimateRequest) -> Result<EstimateResult, EstimateError> {
        let resolved = index.resolve(&request.category_key, &request.service_code)?;
        self.calculate(request, Some(resolved), index.default_labor_rate())
    }

    /// Compute an estimate for an already resolved service.
    ///
    /// Labor rate precedence: positive request override, then the catalog
    /// default, then the configured fallback. Multipliers scale labor only;
    /// parts pass through.
    pub fn calculate(
        &self,
        request: &EstimateRequest,
        resolved: Option<ResolvedService<'_>>,
        catalog_labor_rate: Option<f64>,
    ) -> Result<EstimateResult, EstimateError> {
        let ResolvedService { category, service } = resolved.ok_or_else(|| {
            EstimateError::InvalidSelection(format!(
                "service '{}' in category '{}' was not resolved",
                request.service_code, request.category_key
            ))
        })?;

        let parts_price = validate_amount("parts_price", request.parts_price)?.unwrap_or(0.0);
        let override_rate = validate_amount("labor_rate", request.labor_rate)?.filter(|rate| *rate > 0.0);
        let labor_rate = override_rate
            .or(catalog_labor_rate.filter(|rate| rate.is_finite() && *rate > 0.0))
            .unwrap_or(self.fallback_labor_rate);

        let vehicle = vehicle_multiplier(
            request.vehicle.year,
            &request.vehicle.make,
            &request.vehicle.model,
        );
        let regional = regional_multiplier(&request.zip);
        let combined = vehicle.combined * regional;

        let (pricing_mode, base_low, base_high, rate_used) = match (request.pricing_mode, service.flat_rate()) {
            (PricingMode::Flat, Some((min, max))) => (PricingMode::Flat, min, max, None),
            _ => (
                PricingMode::Hourly,
                service.labor_hours_min * labor_rate,
                service.labor_hours_max * labor_rate,
                Some(labor_rate),
            ),
        };

        let labor_low = finite_amount("labor_rate", round_cents(base_low * combined))?;
        let labor_high = finite_amount("labor_rate", round_cents(base_high * combined))?;
        let parts_price = finite_amount("parts_price", round_cents(parts_price))?;
        let total_low = finite_amount("parts_price", round_cents(labor_low + parts_price))?;
        let total_high = finite_amount("parts_price", round_cents(labor_high + parts_price))?;

        debug!(
            category = %category.key,
            service = %service.code,
            mode = %pricing_mode,
            combined,
            "Computed estimate"
        );

        Ok(EstimateResult {
            category_key: category.key.clone(),
            category_name: category.name.clone(),
            service_code: service.code.clone(),
            service_name: service.name.clone(),
            pricing_mode,
            labor_rate: rate_used,
            labor_low,
            labor_high,
            parts_price,
            total_low,
            total_high,
            multipliers: AppliedMultipliers {
                vehicle,
                regional,
                combined,
            },
        })
    }
}

fn validate_amount(field: &'static str, value: Option<f64>) -> Result<Option<f64>, EstimateError> {
    match value {
        Some(v) if !v.is_finite() => Err(EstimateError::InvalidInput {
            field,
            message: "must be a finite number".to_string(),
        }),
        Some(v) if v < 0.0 => Err(EstimateError::InvalidInput {
            field,
            message: format!("must not be negative (got {})", v),
        }),
        other => Ok(other),
    }
}

/// Reject amounts that overflowed while pricing
fn finite_amount(field: &'static str, value: f64) -> Result<f64, EstimateError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimateError::InvalidInput {
            field,
            message: "is too large to price".to_string(),
        })
    }
}

/// Round a monetary amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, ServiceEntry};
    use crate::pricing::models::VehicleInfo;
    use crate::pricing::multipliers::BodyType;

    fn front_pads(flat: Option<(f64, f64)>) -> ServiceEntry {
        ServiceEntry {
            code: "front_pads".to_string(),
            name: "Front Brake Pads".to_string(),
            labor_hours_min: 1.0,
            labor_hours_max: 1.5,
            flat_rate_min: flat.map(|(min, _)| min),
            flat_rate_max: flat.map(|(_, max)| max),
        }
    }

    fn brakes_index(flat: Option<(f64, f64)>, catalog_rate: Option<f64>) -> CatalogIndex {
        CatalogIndex::new(
            vec![Category::new(
                "brakes".to_string(),
                "Brakes".to_string(),
                vec![front_pads(flat)],
            )],
            catalog_rate,
        )
    }

    fn civic_request() -> EstimateRequest {
        EstimateRequest {
            category_key: "brakes".to_string(),
            service_code: "front_pads".to_string(),
            zip: "92646".to_string(),
            vehicle: VehicleInfo {
                year: Some(2010),
                make: "Honda".to_string(),
                model: "CIVIC".to_string(),
            },
            pricing_mode: PricingMode::Hourly,
            labor_rate: Some(90.0),
            parts_price: Some(40.0),
        }
    }

    #[test]
    fn test_hourly_estimate_with_regional_loading() {
        let index = brakes_index(None, None);
        let result = EstimateCalculator::default().quote(&index, &civic_request()).unwrap();

        assert_eq!(result.pricing_mode, PricingMode::Hourly);
        assert_eq!(result.labor_rate, Some(90.0));
        assert_eq!(result.multipliers.regional, 1.10);
        assert_eq!(result.multipliers.vehicle.body_type, BodyType::Car);
        assert_eq!(result.labor_low, 99.00);
        assert_eq!(result.labor_high, 148.50);
        assert_eq!(result.total_low, 139.00);
        assert_eq!(result.total_high, 188.50);
        assert_eq!(result.service_name, "Front Brake Pads");
        assert_eq!(result.category_name, "Brakes");
    }

    #[test]
    fn test_flat_estimate_uses_flat_rates() {
        let index = brakes_index(Some((150.0, 250.0)), None);
        let request = EstimateRequest {
            pricing_mode: PricingMode::Flat,
            ..civic_request()
        };

        let result = EstimateCalculator::default().quote(&index, &request).unwrap();
        assert_eq!(result.pricing_mode, PricingMode::Flat);
        assert_eq!(result.labor_rate, None);
        assert_eq!(result.labor_low, 165.00);
        assert_eq!(result.labor_high, 275.00);
    }

    #[test]
    fn test_flat_without_flat_rates_falls_back_to_hourly() {
        let index = brakes_index(None, None);
        let request = EstimateRequest {
            pricing_mode: PricingMode::Flat,
            ..civic_request()
        };

        let result = EstimateCalculator::default().quote(&index, &request).unwrap();
        assert_eq!(result.pricing_mode, PricingMode::Hourly);
        assert_eq!(result.labor_low, 99.00);
    }

    #[test]
    fn test_unknown_category_is_lookup_error() {
        let index = brakes_index(None, None);
        let request = EstimateRequest {
            category_key: "tires".to_string(),
            ..civic_request()
        };

        let err = EstimateCalculator::default().quote(&index, &request).unwrap_err();
        assert_eq!(err, EstimateError::Lookup(LookupError::CategoryNotFound("tires".to_string())));
        assert_eq!(err.to_string(), "Invalid category: 'tires'");
        assert_eq!(err.field(), Some("category_key"));
    }

    #[test]
    fn test_unresolved_service_is_invalid_selection() {
        let err = EstimateCalculator::default()
            .calculate(&civic_request(), None, None)
            .unwrap_err();
        assert!(matches!(err, EstimateError::InvalidSelection(_)));
    }

    #[test]
    fn test_empty_zip_has_no_regional_loading() {
        let index = brakes_index(None, None);
        let request = EstimateRequest {
            zip: String::new(),
            ..civic_request()
        };

        let result = EstimateCalculator::default().quote(&index, &request).unwrap();
        assert_eq!(result.multipliers.regional, 1.00);
        assert_eq!(result.labor_low, 90.00);
        assert_eq!(result.labor_high, 135.00);
    }

    #[test]
    fn test_new_truck_stacks_year_and_body_factors() {
        let index = brakes_index(None, None);
        let request = EstimateRequest {
            zip: "60601".to_string(),
            vehicle: VehicleInfo {
                year: Some(2021),
                make: "Ford".to_string(),
                model: "F-150".to_string(),
            },
            parts_price: None,
            ..civic_request()
        };

        let result = EstimateCalculator::default().quote(&index, &request).unwrap();
        assert_eq!(result.multipliers.vehicle.combined, 1.26);
        assert_eq!(result.labor_low, 113.40);
        assert_eq!(result.labor_high, 170.10);
        assert_eq!(result.total_low, result.labor_low);
    }

    #[test]
    fn test_labor_rate_precedence() {
        let calculator = EstimateCalculator::new(80.0);
        let request = EstimateRequest {
            zip: String::new(),
            parts_price: None,
            labor_rate: None,
            ..civic_request()
        };

        let fallback = calculator.quote(&brakes_index(None, None), &request).unwrap();
        assert_eq!(fallback.labor_rate, Some(80.0));

        let catalog = calculator.quote(&brakes_index(None, Some(110.0)), &request).unwrap();
        assert_eq!(catalog.labor_rate, Some(110.0));

        let zero_override = EstimateRequest {
            labor_rate: Some(0.0),
            ..request.clone()
        };
        let result = calculator.quote(&brakes_index(None, Some(110.0)), &zero_override).unwrap();
        assert_eq!(result.labor_rate, Some(110.0));

        let explicit = EstimateRequest {
            labor_rate: Some(125.0),
            ..request
        };
        let result = calculator.quote(&brakes_index(None, Some(110.0)), &explicit).unwrap();
        assert_eq!(result.labor_rate, Some(125.0));
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let index = brakes_index(None, None);

        let negative_parts = EstimateRequest {
            parts_price: Some(-1.0),
            ..civic_request()
        };
        let err = EstimateCalculator::default().quote(&index, &negative_parts).unwrap_err();
        assert_eq!(err.field(), Some("parts_price"));

        let negative_rate = EstimateRequest {
            labor_rate: Some(-90.0),
            ..civic_request()
        };
        let err = EstimateCalculator::default().quote(&index, &negative_rate).unwrap_err();
        assert_eq!(err.field(), Some("labor_rate"));

        let nan_parts = EstimateRequest {
            parts_price: Some(f64::NAN),
            ..civic_request()
        };
        assert!(EstimateCalculator::default().quote(&index, &nan_parts).is_err());
    }

    #[test]
    fn test_overflowing_amounts_are_rejected() {
        let index = brakes_index(None, None);
        let calculator = EstimateCalculator::default();

        let huge_rate = EstimateRequest {
            labor_rate: Some(1e307),
            parts_price: Some(1e307),
            ..civic_request()
        };
        let err = calculator.quote(&index, &huge_rate).unwrap_err();
        assert_eq!(err.field(), Some("labor_rate"));
        assert!(err.to_string().contains("too large"));

        let huge_parts = EstimateRequest {
            parts_price: Some(1e307),
            ..civic_request()
        };
        let err = calculator.quote(&index, &huge_parts).unwrap_err();
        assert_eq!(err.field(), Some("parts_price"));

        // Each bound is finite on its own but the sum is not
        let near_max = EstimateRequest {
            zip: String::new(),
            labor_rate: Some(f64::MAX / 400.0),
            parts_price: Some(f64::MAX / 101.0),
            ..civic_request()
        };
        let err = calculator.quote(&index, &near_max).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidInput { .. }));
    }

    #[test]
    fn test_parts_price_shifts_totals_exactly() {
        let index = brakes_index(None, None);
        let calculator = EstimateCalculator::default();

        let base = calculator.quote(&index, &civic_request()).unwrap();
        let more_parts = EstimateRequest {
            parts_price: Some(65.25),
            ..civic_request()
        };
        let shifted = calculator.quote(&index, &more_parts).unwrap();

        assert_eq!(round_cents(shifted.total_low - base.total_low), 25.25);
        assert_eq!(round_cents(shifted.total_high - base.total_high), 25.25);
        assert_eq!(shifted.labor_low, base.labor_low);
    }

    #[test]
    fn test_labor_scales_linearly_with_rate() {
        let index = brakes_index(None, None);
        let calculator = EstimateCalculator::default();
        let request = EstimateRequest {
            zip: String::new(),
            ..civic_request()
        };

        let single = calculator.quote(&index, &request).unwrap();
        let doubled = calculator
            .quote(
                &index,
                &EstimateRequest {
                    labor_rate: Some(180.0),
                    ..request
                },
            )
            .unwrap();

        assert_eq!(doubled.labor_low, single.labor_low * 2.0);
        assert_eq!(doubled.labor_high, single.labor_high * 2.0);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(148.499_999_9), 148.5);
        assert_eq!(round_cents(99.004), 99.0);
        assert_eq!(round_cents(0.0), 0.0);
    }
}
