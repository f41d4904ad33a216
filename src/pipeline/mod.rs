//! Response sanitization, normalization, enrichment and linkification.

pub mod enrichment;
pub mod linkifier;
pub mod normalizer;
pub mod sanitizer;

pub use enrichment::{image_query, place_query, Enricher, EnrichmentSummary};
pub use linkifier::{annotate_itinerary, AnnotatedActivity, AnnotatedDay, Linkifier};
pub use normalizer::{normalize, normalize_response, normalize_with_report, NormalizationReport};
pub use sanitizer::{sanitize, ParseFailure, ParseResult};

use crate::types::Trip;

/// Sanitize and normalize raw model text into a trip, tagging the destination.
///
/// Also returns the normalization report, or `None` when nothing could be decoded.
pub fn interpret(raw: &str, destination: Option<&str>) -> (Trip, Option<NormalizationReport>) {
    let (mut trip, report) = match sanitize(raw) {
        Ok(payload) => {
            let (trip, report) = normalize_with_report(&payload);
            (trip, Some(report))
        }
        Err(failure) => (normalize_response(Err(failure)), None),
    };

    if trip.destination.is_none() {
        trip.destination = destination
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
    }
    (trip, report)
}
