use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{VehicleError, VehicleSource};

#[derive(Debug, Deserialize)]
struct VpicResponse<T> {
    #[serde(rename = "Results", default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MakeRow {
    #[serde(rename = "MakeName", default)]
    make_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelRow {
    #[serde(rename = "Model_Name", default)]
    model_name: Option<String>,
}

/// NHTSA vPIC vehicle API client
pub struct VpicVehicleSource {
    client: Client,
    base_url: Url,
    vehicle_type: String,
    makes: OnceCell<Vec<String>>,
}

impl VpicVehicleSource {
    pub fn new(base_url: &str, vehicle_type: &str, timeout: Duration) -> Result<Self, VehicleError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| VehicleError::Upstream(format!("invalid vPIC base URL '{}': {}", base_url, e)))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            vehicle_type: vehicle_type.to_string(),
            makes: OnceCell::new(),
        })
    }

    /// `{base}/{endpoint}/{argument}?format=json`, with the argument percent-encoded
    fn endpoint(&self, endpoint: &str, argument: &str) -> Result<Url, VehicleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VehicleError::Upstream(format!("vPIC base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(endpoint)
            .push(argument);
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }

    async fn fetch<T>(&self, url: Url) -> Result<Vec<T>, VehicleError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(%url, "Querying vPIC");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(VehicleError::Upstream(format!("vPIC returned HTTP {}", response.status())));
        }

        let body: VpicResponse<T> = response.json().await?;
        Ok(body.results)
    }

    async fn fetch_makes(&self) -> Result<Vec<String>, VehicleError> {
        let url = self.endpoint("GetMakesForVehicleType", &self.vehicle_type)?;
        let rows: Vec<MakeRow> = self.fetch(url).await?;
        Ok(clean_names(rows.into_iter().filter_map(|row| row.make_name)))
    }
}

/// Trim, drop blanks, sort, dedupe
fn clean_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

#[async_trait]
impl VehicleSource for VpicVehicleSource {
    fn name(&self) -> &'static str {
        "vpic"
    }

    async fn makes(&self) -> Result<Vec<String>, VehicleError> {
        self.makes
            .get_or_try_init(|| self.fetch_makes())
            .await
            .cloned()
    }

    async fn models(&self, make: &str) -> Result<Vec<String>, VehicleError> {
        let make = make.trim();
        if make.is_empty() {
            return Err(VehicleError::UnknownMake(make.to_string()));
        }

        let url = self.endpoint("GetModelsForMake", make)?;
        let rows: Vec<ModelRow> = self.fetch(url).await?;
        let models = clean_names(rows.into_iter().filter_map(|row| row.model_name));

        if models.is_empty() {
            return Err(VehicleError::UnknownMake(make.to_string()));
        }
        Ok(models)
    }
}
