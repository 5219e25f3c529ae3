//! Catalog normalization
//!
//! A catalog document arrives in one of several shapes:
//! - nested categories: `{"categories": [{"key", "name", "services": [...]}]}`
//! - flat rows with inlined category fields: `[{"category": "Brakes", "service": "Pads", ...}]`
//! - a keyed map: `{"brakes": [...], "engine": {"name": "Engine", "services": [...]}}`
//!
//! The document is classified once at the boundary ([`DocumentShape`],
//! [`RawEntry`]) and every entry is reduced to the canonical
//! [`Category`]/[`ServiceEntry`] schema in a single pass.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::aliases::{self, Field, COLLECTION_KEYS, LABOR_RATE_KEYS, SERVICE_LIST_KEYS};
use super::error::CatalogLoadError;
use super::model::{CatalogIndex, Category, ServiceEntry};

/// Fallback labor hours when an entry carries none
pub const DEFAULT_LABOR_HOURS: f64 = 1.0;

/// How deep collection discovery follows nested `catalog`/`data` objects
const MAX_DISCOVERY_DEPTH: usize = 3;

/// Where the entries of a document live
#[derive(Debug)]
enum DocumentShape<'a> {
    /// A list of category objects and/or flat rows
    List(&'a [Value]),
    /// `{category_key: services | category object}`
    KeyedMap(&'a Map<String, Value>),
}

/// One element of an entry list
#[derive(Debug)]
enum RawEntry<'a> {
    /// Object carrying its own service list
    Category {
        fields: &'a Map<String, Value>,
        services: &'a [Value],
    },
    /// Flat row with inlined category and service fields
    Row(&'a Map<String, Value>),
}

impl<'a> RawEntry<'a> {
    fn classify(value: &'a Value) -> Option<Self> {
        let fields = value.as_object()?;
        match service_list(fields) {
            Some(services) => Some(Self::Category { fields, services }),
            None => Some(Self::Row(fields)),
        }
    }
}

fn service_list(fields: &Map<String, Value>) -> Option<&[Value]> {
    SERVICE_LIST_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

/// Display name of a category and where it came from
#[derive(Debug, Clone, PartialEq)]
enum CategoryName {
    /// Given by a name field on the entry
    Explicit(String),
    /// Derived from the raw key
    Derived(String),
}

impl CategoryName {
    fn into_inner(self) -> String {
        match self {
            Self::Explicit(name) | Self::Derived(name) => name,
        }
    }
}

/// Accumulates one category while entries stream in
struct CategoryBuilder {
    key: String,
    name: Option<CategoryName>,
    services: Vec<ServiceEntry>,
    positions: HashMap<String, usize>,
}

impl CategoryBuilder {
    fn new(key: String) -> Self {
        Self {
            key,
            name: None,
            services: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Last-seen entry wins on a duplicate code
    fn push(&mut self, service: ServiceEntry) {
        match self.positions.get(&service.code) {
            Some(&idx) => self.services[idx] = service,
            None => {
                self.positions.insert(service.code.clone(), self.services.len());
                self.services.push(service);
            }
        }
    }

    /// The first explicit name wins over any derived one
    fn offer_name(&mut self, name: Option<CategoryName>) {
        let Some(incoming) = name else { return };
        let replace = match &self.name {
            None => true,
            Some(CategoryName::Derived(_)) => matches!(incoming, CategoryName::Explicit(_)),
            Some(CategoryName::Explicit(_)) => false,
        };
        if replace {
            self.name = Some(incoming);
        }
    }

    fn build(self) -> Category {
        let name = self
            .name
            .map(CategoryName::into_inner)
            .unwrap_or_else(|| self.key.clone());
        Category::new(self.key, name, self.services)
    }
}

#[derive(Default)]
struct Normalizer {
    categories: Vec<CategoryBuilder>,
    positions: HashMap<String, usize>,
    dropped: usize,
}

impl Normalizer {
    fn category(&mut self, key: String, name: Option<CategoryName>) -> &mut CategoryBuilder {
        let idx = match self.positions.get(&key) {
            Some(&idx) => idx,
            None => {
                self.positions.insert(key.clone(), self.categories.len());
                self.categories.push(CategoryBuilder::new(key));
                self.categories.len() - 1
            }
        };

        let builder = &mut self.categories[idx];
        builder.offer_name(name);
        builder
    }

    fn add_entry(&mut self, entry: RawEntry<'_>, key_hint: Option<&str>) {
        match entry {
            RawEntry::Category { fields, services } => {
                let raw_key = aliases::text(fields, Field::CategoryKey)
                    .or_else(|| key_hint.map(str::to_string));
                let Some(key) = raw_key.as_deref().and_then(canonical_id) else {
                    self.dropped += 1;
                    return;
                };
                let name = explicit_or_derived(aliases::text(fields, Field::CategoryName), raw_key);
                self.add_services(key, name, services);
            }
            RawEntry::Row(fields) => {
                let raw_key = aliases::text(fields, Field::RowCategoryKey)
                    .or_else(|| key_hint.map(str::to_string));
                let Some(key) = raw_key.as_deref().and_then(canonical_id) else {
                    self.dropped += 1;
                    return;
                };
                let name = explicit_or_derived(aliases::text(fields, Field::RowCategoryName), raw_key);
                match service_from_fields(fields) {
                    Some(service) => self.category(key, name).push(service),
                    None => self.dropped += 1,
                }
            }
        }
    }

    fn add_services(&mut self, key: String, name: Option<CategoryName>, services: &[Value]) {
        let mut parsed = Vec::with_capacity(services.len());
        for value in services {
            match service_from_value(value) {
                Some(service) => parsed.push(service),
                None => self.dropped += 1,
            }
        }

        let builder = self.category(key, name);
        for service in parsed {
            builder.push(service);
        }
    }

    fn add_keyed_map(&mut self, map: &Map<String, Value>) {
        for (key, value) in map {
            match value {
                Value::Array(services) => {
                    if let Some(canonical) = canonical_id(key) {
                        let name = CategoryName::Derived(key.trim().to_string());
                        self.add_services(canonical, Some(name), services);
                    }
                }
                Value::Object(fields) => match service_list(fields) {
                    Some(services) => {
                        self.add_entry(RawEntry::Category { fields, services }, Some(key.as_str()))
                    }
                    None => self.dropped += 1,
                },
                // Scalars such as a catalog-wide labor rate or a version tag
                _ => {}
            }
        }
    }

    fn finish(self, default_labor_rate: Option<f64>) -> CatalogIndex {
        let categories: Vec<Category> = self
            .categories
            .into_iter()
            .filter(|builder| !builder.services.is_empty())
            .map(CategoryBuilder::build)
            .collect();

        CatalogIndex::new(categories, default_labor_rate)
    }
}

fn explicit_or_derived(explicit: Option<String>, raw_key: Option<String>) -> Option<CategoryName> {
    explicit
        .map(CategoryName::Explicit)
        .or_else(|| raw_key.map(CategoryName::Derived))
}

/// Parse raw bytes as a catalog document and normalize it
pub fn parse_catalog(bytes: &[u8]) -> Result<CatalogIndex, CatalogLoadError> {
    let document: Value = serde_json::from_slice(bytes)?;
    normalize(&document)
}

/// Normalize a catalog document of unknown shape into a [`CatalogIndex`].
///
/// Malformed rows are dropped rather than failing the load; the only
/// failure is a document that yields no categories at all.
pub fn normalize(document: &Value) -> Result<CatalogIndex, CatalogLoadError> {
    let mut normalizer = Normalizer::default();

    match locate_entries(document, 0) {
        Some(DocumentShape::List(entries)) => {
            for value in entries {
                match RawEntry::classify(value) {
                    Some(entry) => normalizer.add_entry(entry, None),
                    None => normalizer.dropped += 1,
                }
            }
        }
        Some(DocumentShape::KeyedMap(map)) => normalizer.add_keyed_map(map),
        None => return Err(CatalogLoadError::Empty),
    }

    let default_labor_rate = document
        .as_object()
        .and_then(|top| aliases::number_at(top, LABOR_RATE_KEYS));

    let dropped = normalizer.dropped;
    let index = normalizer.finish(default_labor_rate);

    if index.is_empty() {
        return Err(CatalogLoadError::Empty);
    }

    debug!(
        categories = index.categories().len(),
        services = index.service_count(),
        dropped,
        "Catalog normalized"
    );

    Ok(index)
}

fn locate_entries(value: &Value, depth: usize) -> Option<DocumentShape<'_>> {
    match value {
        Value::Array(items) => Some(DocumentShape::List(items)),
        Value::Object(map) => {
            for key in COLLECTION_KEYS {
                match map.get(*key) {
                    Some(Value::Array(items)) => return Some(DocumentShape::List(items)),
                    Some(nested @ Value::Object(_)) if depth < MAX_DISCOVERY_DEPTH => {
                        if let Some(shape) = locate_entries(nested, depth + 1) {
                            return Some(shape);
                        }
                    }
                    _ => {}
                }
            }

            let has_collections = map.values().any(|v| v.is_array() || v.is_object());
            has_collections.then_some(DocumentShape::KeyedMap(map))
        }
        _ => None,
    }
}

fn service_from_value(value: &Value) -> Option<ServiceEntry> {
    match value {
        Value::Object(fields) => service_from_fields(fields),
        // Bare service names: `"services": ["Oil Change", ...]`
        Value::String(name) => {
            let code = canonical_id(name)?;
            Some(ServiceEntry {
                code,
                name: name.trim().to_string(),
                labor_hours_min: DEFAULT_LABOR_HOURS,
                labor_hours_max: DEFAULT_LABOR_HOURS,
                flat_rate_min: None,
                flat_rate_max: None,
            })
        }
        _ => None,
    }
}

fn service_from_fields(fields: &Map<String, Value>) -> Option<ServiceEntry> {
    let raw_code = aliases::text(fields, Field::ServiceCode);
    let raw_name = aliases::text(fields, Field::ServiceName);

    let code = raw_code
        .as_deref()
        .or(raw_name.as_deref())
        .and_then(canonical_id)?;
    let name = raw_name.unwrap_or_else(|| code.clone());

    let (labor_hours_min, labor_hours_max) = backfill(
        aliases::number(fields, Field::HoursMin),
        aliases::number(fields, Field::HoursMax),
    )
    .unwrap_or((DEFAULT_LABOR_HOURS, DEFAULT_LABOR_HOURS));

    let flat = backfill(
        aliases::number(fields, Field::FlatMin),
        aliases::number(fields, Field::FlatMax),
    );

    Some(ServiceEntry {
        code,
        name,
        labor_hours_min,
        labor_hours_max,
        flat_rate_min: flat.map(|(min, _)| min),
        flat_rate_max: flat.map(|(_, max)| max),
    })
}

/// Fill a missing bound from the other one and order the pair
fn backfill(min: Option<f64>, max: Option<f64>) -> Option<(f64, f64)> {
    match (min, max) {
        (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
        (Some(v), None) | (None, Some(v)) => Some((v, v)),
        (None, None) => None,
    }
}

/// Canonical identifier: trimmed, lower-cased, non-alphanumeric runs collapsed to `_`
pub fn canonical_id(raw: &str) -> Option<String> {
    let mut id = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !id.is_empty() {
                id.push('_');
            }
            pending_separator = false;
            id.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    (!id.is_empty()).then_some(id)
}
