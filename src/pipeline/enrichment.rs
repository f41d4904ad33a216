//! Best-effort enrichment of a normalized trip with coordinates and an image.
//!
//! Every lookup is independent. A geocode lookup that errors, times out or
//! finds nothing leaves its coordinates as they were. The image is always the
//! one just resolved, so a miss leaves the trip without one. Enrichment itself
//! never fails.

use std::{sync::Arc, time::Duration};

use futures::stream::{self, StreamExt};
use rand::seq::IndexedRandom;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    services::{GeocodeResolver, ImageResult, ImageSearch},
    types::{Accommodation, Coordinates, DayPlan, Season, Trip, TripRequest},
};

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Counts of what one enrichment pass managed to attach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub geocoded: usize,
    pub missed: usize,
    pub image: bool,
}

/// Attaches coordinates and a representative image to trips.
#[derive(Debug, Clone)]
pub struct Enricher {
    geocoder: Arc<dyn GeocodeResolver>,
    images: Arc<dyn ImageSearch>,
    concurrency: usize,
    timeout: Duration,
    image_page: u32,
}

impl Enricher {
    pub fn new(geocoder: Arc<dyn GeocodeResolver>, images: Arc<dyn ImageSearch>) -> Self {
        Self {
            geocoder,
            images,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            image_page: 1,
        }
    }

    /// Maximum number of geocode lookups in flight at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Per-lookup time limit; an expired lookup counts as a miss.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_image_page(mut self, page: u32) -> Self {
        self.image_page = page.max(1);
        self
    }

    /// Return a copy of `trip` with whatever coordinates and image could be resolved.
    pub async fn enrich(&self, trip: Trip, request: &TripRequest) -> Trip {
        self.enrich_with_summary(trip, request).await.0
    }

    pub async fn enrich_with_summary(
        &self,
        trip: Trip,
        request: &TripRequest,
    ) -> (Trip, EnrichmentSummary) {
        let destination = trip
            .destination
            .clone()
            .or_else(|| request.destination_hint().map(str::to_string));
        let hint = destination.as_deref();
        let query = image_query(hint, request.season(), &request.preferences);

        let (accommodation, itinerary, image) = tokio::join!(
            self.enrich_accommodation(&trip.accommodation, hint),
            self.enrich_itinerary(&trip.itinerary, hint),
            self.resolve_image(&query),
        );

        let mut summary = EnrichmentSummary {
            image: image.is_some(),
            ..EnrichmentSummary::default()
        };
        let (accommodation, hit) = accommodation;
        summary.tally(hit);
        let itinerary = itinerary
            .into_iter()
            .map(|(day, hit)| {
                summary.tally(hit);
                day
            })
            .collect();

        info!(
            target: "trip_planner::enrich",
            geocoded = summary.geocoded,
            missed = summary.missed,
            image = summary.image,
            "enrichment finished"
        );

        let trip = Trip {
            accommodation,
            itinerary,
            image,
            destination: trip.destination.or(destination),
            ..trip
        };
        (trip, summary)
    }

    /// Geocode the accommodation; the flag reports whether a lookup succeeded.
    pub async fn enrich_accommodation(
        &self,
        accommodation: &Accommodation,
        destination: Option<&str>,
    ) -> (Accommodation, bool) {
        match self.locate(&accommodation.name, destination).await {
            Some(coords) => (accommodation.clone().with_coordinates(coords), true),
            None => (accommodation.clone(), false),
        }
    }

    pub async fn enrich_day(&self, day: &DayPlan, destination: Option<&str>) -> (DayPlan, bool) {
        match self.locate(&day.summary, destination).await {
            Some(coords) => (day.clone().with_coordinates(coords), true),
            None => (day.clone(), false),
        }
    }

    async fn enrich_itinerary(
        &self,
        days: &[DayPlan],
        destination: Option<&str>,
    ) -> Vec<(DayPlan, bool)> {
        stream::iter(days)
            .map(|day| self.enrich_day(day, destination))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn locate(&self, place: &str, destination: Option<&str>) -> Option<Coordinates> {
        let Some(query) = place_query(place, destination) else {
            debug!(target: "trip_planner::enrich", "miss: nothing to geocode");
            return None;
        };

        match timeout(self.timeout, self.geocoder.resolve(&query)).await {
            Ok(Ok(Some(coords))) => Some(coords),
            Ok(Ok(None)) => {
                debug!(target: "trip_planner::enrich", query = %query, "miss: no geocode result");
                None
            }
            Ok(Err(err)) => {
                warn!(target: "trip_planner::enrich", query = %query, error = %err, "miss: geocoder failed");
                None
            }
            Err(_) => {
                warn!(target: "trip_planner::enrich", query = %query, "miss: geocoder timed out");
                None
            }
        }
    }

    /// Search for images and pick one hit at random, preferring its largest variant.
    pub async fn resolve_image(&self, query: &str) -> Option<String> {
        if query.is_empty() {
            return None;
        }

        let results = match timeout(self.timeout, self.images.search(query, self.image_page)).await
        {
            Ok(Ok(results)) => results,
            Ok(Err(err)) => {
                warn!(target: "trip_planner::enrich", query = %query, error = %err, "miss: image search failed");
                return None;
            }
            Err(_) => {
                warn!(target: "trip_planner::enrich", query = %query, "miss: image search timed out");
                return None;
            }
        };

        let usable: Vec<&ImageResult> = results
            .iter()
            .filter(|result| result.best_url().is_some())
            .collect();
        let chosen = usable.choose(&mut rand::rng());
        if chosen.is_none() {
            debug!(target: "trip_planner::enrich", query = %query, "miss: no usable images");
        }
        chosen.and_then(|result| result.best_url()).map(str::to_string)
    }
}

impl EnrichmentSummary {
    fn tally(&mut self, hit: bool) {
        if hit {
            self.geocoded += 1;
        } else {
            self.missed += 1;
        }
    }
}

/// Geocoding query for a place: its name followed by the destination.
pub fn place_query(place: &str, destination: Option<&str>) -> Option<String> {
    let place = place.trim();
    if place.is_empty() {
        return None;
    }
    Some(match destination.map(str::trim).filter(|d| !d.is_empty()) {
        Some(destination) => format!("{}, {}", place, destination),
        None => place.to_string(),
    })
}

/// Image search query from destination, season and preference tags.
pub fn image_query(destination: Option<&str>, season: Option<Season>, preferences: &[String]) -> String {
    destination
        .into_iter()
        .chain(season.map(|season| season.label()))
        .chain(preferences.iter().map(String::as_str))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_query_appends_destination() {
        assert_eq!(
            place_query(" Hotel Artemide ", Some("Rome")).as_deref(),
            Some("Hotel Artemide, Rome")
        );
        assert_eq!(place_query("Colosseum", None).as_deref(), Some("Colosseum"));
        assert_eq!(place_query("  ", Some("Rome")), None);
    }

    #[test]
    fn test_image_query_parts() {
        let prefs = vec!["food".to_string(), " ".to_string(), "art".to_string()];
        assert_eq!(
            image_query(Some("Rome"), Some(Season::Autumn), &prefs),
            "Rome autumn food art"
        );
        assert_eq!(image_query(None, None, &[]), "");
    }
}
