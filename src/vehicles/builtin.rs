use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

use super::{VehicleError, VehicleSource};

const BUILTIN_MAKES: &[(&str, &[&str])] = &[
    (
        "Toyota",
        &["Camry", "Corolla", "Tacoma", "Tundra", "Sequoia", "RAV4", "Highlander"],
    ),
    ("Honda", &["Civic", "Accord", "CR-V", "Pilot", "Odyssey"]),
    ("Ford", &["F-150", "Escape", "Explorer", "Mustang", "Ranger"]),
    (
        "Chevrolet",
        &["Silverado 1500", "Tahoe", "Suburban", "Malibu", "Equinox"],
    ),
    ("Nissan", &["Altima", "Sentra", "Rogue", "Frontier", "Pathfinder"]),
];

/// Fixed make -> models table
#[derive(Debug, Clone)]
pub struct StaticVehicleSource {
    makes: BTreeMap<String, Vec<String>>,
}

impl StaticVehicleSource {
    /// The table shipped with the service
    pub fn builtin() -> Self {
        Self::from_map(
            BUILTIN_MAKES
                .iter()
                .map(|(make, models)| {
                    (
                        make.to_string(),
                        models.iter().map(|m| m.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    pub fn from_map(makes: HashMap<String, Vec<String>>) -> Self {
        let makes = makes
            .into_iter()
            .map(|(make, mut models)| {
                models.sort();
                models.dedup();
                (make.trim().to_string(), models)
            })
            .collect();

        Self { makes }
    }
}

#[async_trait]
impl VehicleSource for StaticVehicleSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn makes(&self) -> Result<Vec<String>, VehicleError> {
        Ok(self.makes.keys().cloned().collect())
    }

    async fn models(&self, make: &str) -> Result<Vec<String>, VehicleError> {
        self.makes
            .get(make)
            .cloned()
            .ok_or_else(|| VehicleError::UnknownMake(make.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_makes_are_sorted() {
        let source = StaticVehicleSource::builtin();
        assert_eq!(
            source.makes().await.unwrap(),
            vec!["Chevrolet", "Ford", "Honda", "Nissan", "Toyota"]
        );
    }

    #[tokio::test]
    async fn test_models_for_make() {
        let source = StaticVehicleSource::builtin();
        assert_eq!(
            source.models("Honda").await.unwrap(),
            vec!["Accord", "CR-V", "Civic", "Odyssey", "Pilot"]
        );
    }

    #[tokio::test]
    async fn test_make_match_is_exact() {
        let source = StaticVehicleSource::builtin();
        let err = source.models("honda").await.unwrap_err();
        assert!(matches!(err, VehicleError::UnknownMake(ref make) if make == "honda"));
        assert_eq!(err.to_string(), "Make 'honda' not found");
    }

    #[tokio::test]
    async fn test_configured_table() {
        let mut makes = HashMap::new();
        makes.insert(
            "Subaru".to_string(),
            vec!["Outback".to_string(), "Forester".to_string(), "Outback".to_string()],
        );

        let source = StaticVehicleSource::from_map(makes);
        assert_eq!(source.makes().await.unwrap(), vec!["Subaru"]);
        assert_eq!(source.models("Subaru").await.unwrap(), vec!["Forester", "Outback"]);
    }
}
