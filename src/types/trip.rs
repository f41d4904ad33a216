use std::collections::BTreeMap;
use std::sync::OnceLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schemas::{CompletionSchema, SchemaHandle};

/// Summary used when the generated payload carried none.
pub const DEFAULT_SUMMARY: &str = "No summary available";

/// Summary marker used when the generated payload could not be decoded at all.
pub const PARSE_ERROR_SUMMARY: &str =
    "Error: the generated trip plan could not be parsed. Please try again.";

/// Normalized travel plan consumed by rendering and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Trip {
    /// Narrative overview of the whole trip
    pub summary: String,
    /// Estimated spend per open-ended category (e.g. "lodging", "food")
    pub budget_breakdown: BTreeMap<String, f64>,
    /// Recommended lodging for the stay
    pub accommodation: Accommodation,
    /// Day-by-day plan, day 1 first
    pub itinerary: Vec<DayPlan>,
    /// Representative image URL, attached during enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Destination echoed from the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Lodging recommendation with optional resolved coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Accommodation {
    /// Hotel or lodging name
    pub name: String,
    /// Nightly rate in the plan currency
    pub price_per_night: f64,
    /// Short description of the lodging and neighbourhood
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Per-day itinerary entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DayPlan {
    /// 1-based day counter matching the position in the itinerary
    pub day: u32,
    /// Short label for the day, also used as the geocoding query
    pub summary: String,
    /// Estimated total spend for the day
    pub estimated_cost: f64,
    /// Activities in chronological order
    pub details: Vec<ActivityEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// A single timed activity within a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityEntry {
    /// Free-text time label such as "Morning" or "14:00"
    pub time: String,
    /// Free-text description of the activity
    pub activity: String,
}

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Trip {
    /// All-defaults trip carrying the given summary.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            budget_breakdown: BTreeMap::new(),
            accommodation: Accommodation::default(),
            itinerary: Vec::new(),
            image: None,
            destination: None,
        }
    }

    /// Trip returned when the model output could not be decoded.
    pub fn parse_error() -> Self {
        Self::with_summary(PARSE_ERROR_SUMMARY)
    }

    pub fn total_budget(&self) -> f64 {
        self.budget_breakdown.values().sum()
    }
}

impl Default for Trip {
    fn default() -> Self {
        Self::with_summary(DEFAULT_SUMMARY)
    }
}

impl Accommodation {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            lat: self.lat?,
            lng: self.lng?,
        })
    }

    pub fn with_coordinates(mut self, coords: Coordinates) -> Self {
        self.lat = Some(coords.lat);
        self.lng = Some(coords.lng);
        self
    }
}

impl DayPlan {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            lat: self.lat?,
            lng: self.lng?,
        })
    }

    pub fn with_coordinates(mut self, coords: Coordinates) -> Self {
        self.lat = Some(coords.lat);
        self.lng = Some(coords.lng);
        self
    }
}

impl CompletionSchema for Trip {
    fn schema() -> &'static SchemaHandle {
        static HANDLE: OnceLock<SchemaHandle> = OnceLock::new();
        HANDLE.get_or_init(|| {
            let root = schemars::schema_for!(Trip);
            SchemaHandle::from_root_schema::<Trip>("trip", "Trip", root)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted_when_unset() {
        let value = serde_json::to_value(Trip::default()).unwrap();
        assert_eq!(value["summary"], DEFAULT_SUMMARY);
        assert!(value.get("image").is_none());
        assert!(value["accommodation"].get("lat").is_none());
        assert!(value["itinerary"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_coordinates_require_both_axes() {
        let mut day = DayPlan {
            lat: Some(48.85),
            ..DayPlan::default()
        };
        assert!(day.coordinates().is_none());

        day = day.with_coordinates(Coordinates { lat: 1.0, lng: 2.0 });
        assert_eq!(day.coordinates(), Some(Coordinates { lat: 1.0, lng: 2.0 }));
    }

    #[test]
    fn test_schema_lists_structural_fields() {
        let schema = Trip::schema().schema_json();
        let required = schema["required"].as_array().unwrap();
        for field in ["summary", "budget_breakdown", "accommodation", "itinerary"] {
            assert!(required.iter().any(|value| value == field), "{field}");
        }
    }
}
