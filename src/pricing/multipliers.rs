//! Vehicle and regional price adjustment factors
//!
//! Both are heuristics. Unrecognized or malformed input degrades to a
//! factor of 1.00 and never produces an error.

use serde::Serialize;

/// Coarse body classification inferred from make and model names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Truck,
    Suv,
    Van,
    Car,
}

impl BodyType {
    pub fn factor(self) -> f64 {
        match self {
            Self::Truck => 1.20,
            Self::Suv => 1.10,
            Self::Van => 1.10,
            Self::Car => 1.00,
        }
    }
}

/// Model names in compact form (upper-case, alphanumerics only), matched
/// against whole words of the make and model.
///
/// Checked in order: vans before trucks so "Ram ProMaster" is a van, trucks
/// before SUVs so "Silverado" never falls through.
const BODY_FRAGMENTS: &[(BodyType, &[&str])] = &[
    (
        BodyType::Van,
        &[
            "ODYSSEY", "SIENNA", "TRANSIT", "PROMASTER", "SPRINTER", "PACIFICA", "CARAVAN",
            "QUEST", "EXPRESS", "SAVANA", "NV200", "NV3500", "METRIS", "CARNIVAL", "SEDONA",
        ],
    ),
    (
        BodyType::Truck,
        &[
            "F150", "F250", "F350", "SILVERADO", "SIERRA", "TACOMA", "TUNDRA", "RANGER",
            "FRONTIER", "TITAN", "COLORADO", "CANYON", "RIDGELINE", "GLADIATOR", "MAVERICK",
            "RAM1500", "RAM2500", "RAM3500", "SANTACRUZ",
        ],
    ),
    (
        BodyType::Suv,
        &[
            "RAV4", "CRV", "HRV", "HIGHLANDER", "SEQUOIA", "4RUNNER", "PILOT", "PASSPORT",
            "ESCAPE", "EXPLORER", "EXPEDITION", "BRONCO", "EDGE", "TAHOE", "SUBURBAN", "EQUINOX",
            "TRAVERSE", "BLAZER", "TRAILBLAZER", "YUKON", "ROGUE", "PATHFINDER", "ARMADA",
            "MURANO", "KICKS", "CHEROKEE", "WRANGLER", "DURANGO", "CX5", "CX9", "OUTBACK",
            "FORESTER", "ASCENT", "TUCSON", "SANTAFE", "PALISADE", "SORENTO", "SPORTAGE",
            "TELLURIDE", "RANGEROVER", "DEFENDER", "DISCOVERY",
        ],
    ),
];

/// Upper-cased words of make and model, plus each adjacent pair joined, so
/// "F-150", "CR-V" and "Ram 1500" match their compact names while "Range
/// Rover" never matches "RANGER".
fn name_tokens(make: &str, model: &str) -> Vec<String> {
    let words: Vec<String> = format!("{} {}", make, model)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_uppercase())
        .collect();

    let joined: Vec<String> = words.windows(2).map(|pair| pair.concat()).collect();
    words.into_iter().chain(joined).collect()
}

/// Classify a vehicle by matching make and model words against known models
pub fn classify_body_type(make: &str, model: &str) -> BodyType {
    let tokens = name_tokens(make, model);
    if tokens.is_empty() {
        return BodyType::Car;
    }

    BODY_FRAGMENTS
        .iter()
        .find(|(_, fragments)| {
            fragments
                .iter()
                .any(|fragment| tokens.iter().any(|token| token == fragment))
        })
        .map(|(body_type, _)| *body_type)
        .unwrap_or(BodyType::Car)
}

/// Age loading: 1.08 up to 2005, 1.05 from 2020, otherwise 1.00
pub fn year_factor(year: Option<i32>) -> f64 {
    match year {
        Some(y) if y <= 2005 => 1.08,
        Some(y) if y >= 2020 => 1.05,
        _ => 1.00,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleMultiplier {
    pub year_factor: f64,
    pub body_type: BodyType,
    pub body_factor: f64,
    /// `year_factor * body_factor`
    pub combined: f64,
}

pub fn vehicle_multiplier(year: Option<i32>, make: &str, model: &str) -> VehicleMultiplier {
    let year_factor = year_factor(year);
    let body_type = classify_body_type(make, model);
    let body_factor = body_type.factor();

    VehicleMultiplier {
        year_factor,
        body_type,
        body_factor,
        combined: round_factor(year_factor * body_factor),
    }
}

/// Regional loading from the leading ZIP digit.
///
/// The first five characters (after trimming) must be ASCII digits, so
/// `92646` and `92646-1234` qualify while `9A` or an empty string get 1.00.
pub fn regional_multiplier(zip: &str) -> f64 {
    let zip = zip.trim();
    let zip5 = zip.get(..5).unwrap_or("");
    if zip5.len() != 5 || !zip5.bytes().all(|b| b.is_ascii_digit()) {
        return 1.00;
    }

    match zip5.as_bytes()[0] {
        b'9' => 1.10,
        b'0' | b'1' => 1.08,
        _ => 1.00,
    }
}

/// Strip float noise from products like 1.05 * 1.20
fn round_factor(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
