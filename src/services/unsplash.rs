use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{PlannerError, Result},
    services::{ImageResult, ImageSearch},
};

pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
const PER_PAGE: u32 = 10;

/// Image search backed by the Unsplash photo search API.
#[derive(Debug, Clone)]
pub struct UnsplashImageSearch {
    access_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    urls: PhotoUrls,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoUrls {
    full: Option<String>,
    regular: Option<String>,
}

impl UnsplashImageSearch {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: DEFAULT_UNSPLASH_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ImageSearch for UnsplashImageSearch {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<ImageResult>> {
        let page = page.to_string();
        let per_page = PER_PAGE.to_string();
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query),
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .map_err(|err| {
                PlannerError::Collaborator(format!("Failed to call image search: {}", err))
            })?;

        if !response.status().is_success() {
            return Err(PlannerError::Collaborator(format!(
                "Image search returned status {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await.map_err(|err| {
            PlannerError::Collaborator(format!("Failed to decode image search response: {}", err))
        })?;

        Ok(body
            .results
            .into_iter()
            .map(|photo| ImageResult {
                full: photo.urls.full,
                regular: photo.urls.regular,
            })
            .collect())
    }
}
