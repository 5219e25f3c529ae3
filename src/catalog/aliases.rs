//! Field alias tables for catalog documents
//!
//! Catalog producers name the same field differently (`category`,
//! `service_category`, `categoryKey`, ...). Each canonical field maps to an
//! ordered list of accepted names. Supporting a new producer means adding
//! names here; the normalizer never branches on individual spellings.

use serde_json::{Map, Value};

/// Keys probed, in order, for the list of rows or categories in a document
pub const COLLECTION_KEYS: &[&str] = &["items", "services", "categories", "rows", "catalog", "data"];

/// Keys under which a nested category object carries its services
pub const SERVICE_LIST_KEYS: &[&str] = &["services", "items", "entries"];

/// Top-level keys carrying a catalog-wide hourly labor rate
pub const LABOR_RATE_KEYS: &[&str] = &["labor_rate", "default_labor_rate", "hourly_rate", "laborRate"];

/// Canonical fields of a catalog row, nested category, or service entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Category key inlined on a flat row
    RowCategoryKey,
    /// Category display name inlined on a flat row
    RowCategoryName,
    /// Key of a nested category object
    CategoryKey,
    /// Display name of a nested category object
    CategoryName,
    ServiceCode,
    ServiceName,
    HoursMin,
    HoursMax,
    FlatMin,
    FlatMax,
}

/// Accepted names per field, first match wins.
///
/// Single-value spellings (`labor_hours`, `flat_rate`, ...) sit at the end of
/// both the min and the max list so a lone value fills both bounds.
const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (
        Field::RowCategoryKey,
        &["category_key", "categoryKey", "category", "service_category", "cat"],
    ),
    (
        Field::RowCategoryName,
        &["category_name", "categoryName", "category_label", "category", "service_category"],
    ),
    (
        Field::CategoryKey,
        &["key", "category_key", "categoryKey", "id", "slug", "category"],
    ),
    (Field::CategoryName, &["name", "label", "title", "category_name"]),
    (
        Field::ServiceCode,
        &["code", "service_code", "serviceCode", "id", "slug", "key"],
    ),
    (
        Field::ServiceName,
        &["name", "service", "service_name", "serviceName", "label", "title"],
    ),
    (
        Field::HoursMin,
        &[
            "labor_hours_min",
            "laborHoursMin",
            "hours_min",
            "min_hours",
            "labor_min",
            "labor_hours",
            "laborHours",
            "hours",
        ],
    ),
    (
        Field::HoursMax,
        &[
            "labor_hours_max",
            "laborHoursMax",
            "hours_max",
            "max_hours",
            "labor_max",
            "labor_hours",
            "laborHours",
            "hours",
        ],
    ),
    (
        Field::FlatMin,
        &[
            "flat_rate_min",
            "flatRateMin",
            "flat_min",
            "price_min",
            "flat_rate",
            "flatRate",
            "base_price",
            "price",
        ],
    ),
    (
        Field::FlatMax,
        &[
            "flat_rate_max",
            "flatRateMax",
            "flat_max",
            "price_max",
            "flat_rate",
            "flatRate",
            "base_price",
            "price",
        ],
    ),
];

/// Accepted names for `field`, in priority order
pub fn names(field: Field) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// First non-empty textual value for `field`.
///
/// Numbers are accepted and rendered as text so numeric ids still resolve.
pub fn text(obj: &Map<String, Value>, field: Field) -> Option<String> {
    names(field).iter().find_map(|name| match obj.get(*name)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First alias for `field` whose value coerces to a positive, finite number
pub fn number(obj: &Map<String, Value>, field: Field) -> Option<f64> {
    names(field)
        .iter()
        .find_map(|name| obj.get(*name).and_then(coerce_number))
}

/// First of `keys` holding a positive, finite number
pub fn number_at(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| obj.get(*key).and_then(coerce_number))
}

/// Numeric coercion for loosely typed producers.
///
/// Accepts JSON numbers and numeric strings (`"1.5"`, `"$1,200"`). Anything
/// else, and any value that is not strictly positive, counts as absent.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    }?;

    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}
