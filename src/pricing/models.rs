use serde::{Deserialize, Deserializer, Serialize};

use super::multipliers::VehicleMultiplier;

/// How the labor portion of an estimate is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    /// Fixed labor price from the catalog, when the service has one
    Flat,
    /// Labor hours multiplied by an hourly rate
    #[default]
    Hourly,
}

impl std::fmt::Display for PricingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Hourly => f.write_str("hourly"),
        }
    }
}

/// Vehicle context of a request. Advisory only, never validated against
/// the vehicle data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
}

/// Accept `2015`, `"2015"`, or nothing; anything unparseable counts as unknown
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearInput {
        Number(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<YearInput>::deserialize(deserializer)? {
        Some(YearInput::Number(n)) => i32::try_from(n).ok(),
        Some(YearInput::Text(s)) => s.trim().parse().ok(),
        Some(YearInput::Other(_)) | None => None,
    })
}

/// Request for a price estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(alias = "category", alias = "categoryKey")]
    pub category_key: String,
    #[serde(alias = "service", alias = "serviceCode")]
    pub service_code: String,
    #[serde(default, alias = "zip_code")]
    pub zip: String,
    #[serde(flatten)]
    pub vehicle: VehicleInfo,
    #[serde(default, alias = "mode")]
    pub pricing_mode: PricingMode,
    /// Hourly rate override; ignored unless positive
    #[serde(default, alias = "labor_rate_override")]
    pub labor_rate: Option<f64>,
    #[serde(default)]
    pub parts_price: Option<f64>,
}

/// Factors that scaled the labor bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedMultipliers {
    pub vehicle: VehicleMultiplier,
    pub regional: f64,
    /// `vehicle.combined * regional`
    pub combined: f64,
}

/// Computed price range for one service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResult {
    pub category_key: String,
    pub category_name: String,
    pub service_code: String,
    pub service_name: String,
    /// Mode actually applied; `flat` falls back to `hourly` without flat rates
    pub pricing_mode: PricingMode,
    /// Hourly rate used, absent for flat pricing
    pub labor_rate: Option<f64>,
    pub labor_low: f64,
    pub labor_high: f64,
    pub parts_price: f64,
    pub total_low: f64,
    pub total_high: f64,
    pub multipliers: AppliedMultipliers,
}
