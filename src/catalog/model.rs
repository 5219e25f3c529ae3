use serde::Serialize;
use std::collections::HashMap;

use super::error::LookupError;

/// A repair service in canonical form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceEntry {
    pub code: String,
    pub name: String,
    pub labor_hours_min: f64,
    pub labor_hours_max: f64,
    pub flat_rate_min: Option<f64>,
    pub flat_rate_max: Option<f64>,
}

impl ServiceEntry {
    /// Flat labor price bounds, when both are present
    pub fn flat_rate(&self) -> Option<(f64, f64)> {
        match (self.flat_rate_min, self.flat_rate_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }
}

/// A group of services under a stable key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub key: String,
    pub name: String,
    services: Vec<ServiceEntry>,
    #[serde(skip)]
    by_code: HashMap<String, usize>,
}

impl Category {
    /// Build a category; services are sorted by display name (case-insensitive).
    ///
    /// Codes are expected to be unique already; on a duplicate the later
    /// entry shadows the earlier one in lookups.
    pub fn new(key: String, name: String, mut services: Vec<ServiceEntry>) -> Self {
        services.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.code.cmp(&b.code))
        });

        let by_code = services
            .iter()
            .enumerate()
            .map(|(idx, service)| (service.code.clone(), idx))
            .collect();

        Self {
            key,
            name,
            services,
            by_code,
        }
    }

    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    pub fn find_service(&self, code: &str) -> Option<&ServiceEntry> {
        self.by_code.get(code).map(|&idx| &self.services[idx])
    }
}

/// A category/service pair resolved against the index
#[derive(Debug, Clone, Copy)]
pub struct ResolvedService<'a> {
    pub category: &'a Category,
    pub service: &'a ServiceEntry,
}

/// Canonical, queryable catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIndex {
    categories: Vec<Category>,
    by_key: HashMap<String, usize>,
    default_labor_rate: Option<f64>,
}

impl CatalogIndex {
    /// Build an index; categories are sorted by display name (case-insensitive).
    pub fn new(mut categories: Vec<Category>, default_labor_rate: Option<f64>) -> Self {
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.key.cmp(&b.key))
        });

        let by_key = categories
            .iter()
            .enumerate()
            .map(|(idx, category)| (category.key.clone(), idx))
            .collect();

        Self {
            categories,
            by_key,
            default_labor_rate,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Catalog-wide hourly labor rate, if the document declared one
    pub fn default_labor_rate(&self) -> Option<f64> {
        self.default_labor_rate
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn service_count(&self) -> usize {
        self.categories.iter().map(|c| c.services.len()).sum()
    }

    /// Exact, case-sensitive lookup by canonical category key
    pub fn find_category(&self, key: &str) -> Result<&Category, LookupError> {
        self.by_key
            .get(key)
            .map(|&idx| &self.categories[idx])
            .ok_or_else(|| LookupError::CategoryNotFound(key.to_string()))
    }

    /// Exact, case-sensitive lookup by canonical category key and service code
    pub fn find_service(&self, category_key: &str, code: &str) -> Result<&ServiceEntry, LookupError> {
        self.resolve(category_key, code).map(|resolved| resolved.service)
    }

    pub fn resolve(&self, category_key: &str, code: &str) -> Result<ResolvedService<'_>, LookupError> {
        let category = self.find_category(category_key)?;
        let service = category
            .find_service(code)
            .ok_or_else(|| LookupError::ServiceNotFound {
                category: category_key.to_string(),
                code: code.to_string(),
            })?;

        Ok(ResolvedService { category, service })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(code: &str, name: &str) -> ServiceEntry {
        ServiceEntry {
            code: code.to_string(),
            name: name.to_string(),
            labor_hours_min: 1.0,
            labor_hours_max: 1.0,
            flat_rate_min: None,
            flat_rate_max: None,
        }
    }

    #[test]
    fn test_category_sorts_services_case_insensitively() {
        let category = Category::new(
            "brakes".to_string(),
            "Brakes".to_string(),
            vec![
                service("rotors", "rotors"),
                service("pads", "Pads"),
                service("calipers", "Calipers"),
            ],
        );

        let names: Vec<&str> = category.services().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Calipers", "Pads", "rotors"]);
        assert_eq!(category.find_service("rotors").unwrap().name, "rotors");
    }

    #[test]
    fn test_index_lookup() {
        let index = CatalogIndex::new(
            vec![
                Category::new("engine".to_string(), "Engine".to_string(), vec![service("diag", "Diagnostic")]),
                Category::new("brakes".to_string(), "Brakes".to_string(), vec![service("pads", "Pads")]),
            ],
            None,
        );

        assert_eq!(index.categories()[0].key, "brakes");
        assert_eq!(index.find_service("brakes", "pads").unwrap().code, "pads");
        assert_eq!(
            index.find_category("Brakes").unwrap_err(),
            LookupError::CategoryNotFound("Brakes".to_string())
        );
        assert_eq!(
            index.find_service("brakes", "diag").unwrap_err(),
            LookupError::ServiceNotFound {
                category: "brakes".to_string(),
                code: "diag".to_string(),
            }
        );
        assert_eq!(index.service_count(), 2);
    }

    #[test]
    fn test_flat_rate_requires_both_bounds() {
        let mut entry = service("pads", "Pads");
        assert!(entry.flat_rate().is_none());

        entry.flat_rate_min = Some(150.0);
        assert!(entry.flat_rate().is_none());

        entry.flat_rate_max = Some(250.0);
        assert_eq!(entry.flat_rate(), Some((150.0, 250.0)));
    }
}
