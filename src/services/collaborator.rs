use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{error::Result, types::Coordinates};

/// Supplies raw model text for a conversation.
#[async_trait]
pub trait GenerationSource: Send + Sync + Debug {
    /// Return the raw text of the model's reply to `messages`.
    async fn complete(&self, messages: Vec<Value>) -> Result<String>;
}

/// Resolves free-text place descriptions to coordinates.
#[async_trait]
pub trait GeocodeResolver: Send + Sync + Debug {
    /// `Ok(None)` means the service answered but knew no such place.
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>>;
}

/// Searches a photo catalogue.
#[async_trait]
pub trait ImageSearch: Send + Sync + Debug {
    /// Return one page of candidates for `query` (pages are 1-based).
    async fn search(&self, query: &str, page: u32) -> Result<Vec<ImageResult>>;
}

/// URL variants offered for one search hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageResult {
    pub full: Option<String>,
    pub regular: Option<String>,
}

impl ImageResult {
    /// Highest-resolution variant available: `full`, then `regular`.
    pub fn best_url(&self) -> Option<&str> {
        self.full
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.regular.as_deref().filter(|url| !url.is_empty()))
    }
}

/// Geocoder used when no geocoding credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGeocoder;

#[async_trait]
impl GeocodeResolver for DisabledGeocoder {
    async fn resolve(&self, _place: &str) -> Result<Option<Coordinates>> {
        Ok(None)
    }
}

/// Image search used when no image-search credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledImageSearch;

#[async_trait]
impl ImageSearch for DisabledImageSearch {
    async fn search(&self, _query: &str, _page: u32) -> Result<Vec<ImageResult>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_url_prefers_full() {
        let result = ImageResult {
            full: Some("https://img/full".into()),
            regular: Some("https://img/regular".into()),
        };
        assert_eq!(result.best_url(), Some("https://img/full"));
    }

    #[test]
    fn test_best_url_falls_back_to_regular() {
        let result = ImageResult {
            full: Some(String::new()),
            regular: Some("https://img/regular".into()),
        };
        assert_eq!(result.best_url(), Some("https://img/regular"));
        assert_eq!(ImageResult::default().best_url(), None);
    }
}
