use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{PlannerError, Result},
    services::GeocodeResolver,
    types::Coordinates,
};

pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://maps.googleapis.com";

/// Geocoder backed by the Google Maps geocoding endpoint.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl GeocodeResolver for GoogleGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", place), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| PlannerError::Collaborator(format!("Failed to call geocoder: {}", err)))?;

        if !response.status().is_success() {
            return Err(PlannerError::Collaborator(format!(
                "Geocoder returned status {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|err| {
            PlannerError::Collaborator(format!("Failed to decode geocoder response: {}", err))
        })?;

        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" | "" => {}
            other => {
                return Err(PlannerError::Collaborator(format!(
                    "Geocoder status {}: {}",
                    other,
                    body.error_message.unwrap_or_default()
                )))
            }
        }

        Ok(body
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location))
    }
}
