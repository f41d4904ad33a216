//! Runtime configuration, read once at the edge and passed down explicitly.

use std::{sync::Arc, time::Duration};

use crate::{
    error::{PlannerError, Result},
    pipeline::Enricher,
    services::{
        geocoding::DEFAULT_GEOCODE_BASE_URL, openai_client::DEFAULT_BASE_URL,
        openai_client::DEFAULT_MODEL, unsplash::DEFAULT_UNSPLASH_BASE_URL, DisabledGeocoder,
        DisabledImageSearch, GeocodeResolver, GoogleGeocoder, ImageSearch, OpenAIClient,
        UnsplashImageSearch,
    },
};

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub openai_api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub google_maps_api_key: Option<String>,
    pub geocode_base_url: String,
    pub unsplash_access_key: Option<String>,
    pub unsplash_base_url: String,
    /// Geocode lookups allowed in flight at once
    pub enrichment_concurrency: usize,
    /// Time limit for each geocode or image lookup
    pub enrichment_timeout: Duration,
    /// Time limit for one generation call, retries included
    pub generation_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            google_maps_api_key: None,
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            unsplash_access_key: None,
            unsplash_base_url: DEFAULT_UNSPLASH_BASE_URL.to_string(),
            enrichment_concurrency: 4,
            enrichment_timeout: Duration::from_secs(10),
            generation_timeout: Duration::from_secs(120),
        }
    }
}

impl PlannerConfig {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL")
                .or_else(|| get("OPENROUTER_BASE_URL"))
                .unwrap_or(defaults.base_url),
            model: get("MODEL").unwrap_or(defaults.model),
            google_maps_api_key: get("GOOGLE_MAPS_API_KEY"),
            geocode_base_url: get("GEOCODE_BASE_URL").unwrap_or(defaults.geocode_base_url),
            unsplash_access_key: get("UNSPLASH_ACCESS_KEY"),
            unsplash_base_url: get("UNSPLASH_BASE_URL").unwrap_or(defaults.unsplash_base_url),
            enrichment_concurrency: parse_var(&get, "ENRICHMENT_CONCURRENCY")?
                .unwrap_or(defaults.enrichment_concurrency),
            enrichment_timeout: parse_var(&get, "ENRICHMENT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.enrichment_timeout),
            generation_timeout: parse_var(&get, "GENERATION_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.generation_timeout),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Client for the generation source; requires an API key.
    pub fn generator(&self) -> Result<OpenAIClient> {
        let api_key = self.openai_api_key.clone().ok_or_else(|| {
            PlannerError::Config(
                "OPENAI_API_KEY environment variable must be set to generate trips".to_string(),
            )
        })?;
        Ok(OpenAIClient::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
            .with_timeout(self.generation_timeout))
    }

    /// Enricher wired to the configured services; absent keys disable a service.
    pub fn enricher(&self) -> Enricher {
        let geocoder: Arc<dyn GeocodeResolver> = match &self.google_maps_api_key {
            Some(key) => Arc::new(
                GoogleGeocoder::new(key.clone()).with_base_url(self.geocode_base_url.clone()),
            ),
            None => Arc::new(DisabledGeocoder),
        };
        let images: Arc<dyn ImageSearch> = match &self.unsplash_access_key {
            Some(key) => Arc::new(
                UnsplashImageSearch::new(key.clone()).with_base_url(self.unsplash_base_url.clone()),
            ),
            None => Arc::new(DisabledImageSearch),
        };

        Enricher::new(geocoder, images)
            .with_concurrency(self.enrichment_concurrency)
            .with_timeout(self.enrichment_timeout)
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|err| PlannerError::Config(format!("{} has invalid value `{}`: {}", key, raw, err)))
        })
        .transpose()
}
