//! Conversion of an untyped decoded payload into a [`Trip`].
//!
//! Nothing in here fails: every missing or mistyped field is replaced by a
//! default so the rest of the pipeline only ever sees a complete record. An
//! `image` in the payload is ignored.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    pipeline::sanitizer::ParseResult,
    schemas::{audit_payload, CompletionSchema},
    types::{Accommodation, ActivityEntry, DayPlan, Trip, DEFAULT_SUMMARY},
};

/// Wrapper keys tried first when unwrapping an envelope, in order.
const ENVELOPE_KEYS: [&str; 6] = ["data", "trip", "plan", "result", "response", "itinerary_plan"];

/// What the normalizer had to do to produce a [`Trip`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    /// Envelope key the trip was unwrapped from, if any
    pub unwrapped_from: Option<String>,
    /// Top-level fields that were absent or unusable and got their default
    pub defaulted: Vec<&'static str>,
    /// Schema violations found in the payload before repair
    pub schema_violations: Vec<String>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.unwrapped_from.is_none()
            && self.defaulted.is_empty()
            && self.schema_violations.is_empty()
    }
}

/// Turn a sanitizer outcome into a trip; a parse failure yields the error-marker trip.
pub fn normalize_response(parsed: ParseResult) -> Trip {
    match parsed {
        Ok(payload) => normalize(&payload),
        Err(failure) => {
            warn!(
                target: "trip_planner::normalize",
                reason = %failure.reason,
                raw_len = failure.raw.len(),
                "falling back to error-marker trip"
            );
            Trip::parse_error()
        }
    }
}

/// Normalize a decoded payload into a trip.
pub fn normalize(payload: &Value) -> Trip {
    normalize_with_report(payload).0
}

/// Normalize a decoded payload and describe the repairs made.
pub fn normalize_with_report(payload: &Value) -> (Trip, NormalizationReport) {
    let mut report = NormalizationReport::default();

    let (payload, unwrapped_from) = unwrap_envelope(payload);
    report.unwrapped_from = unwrapped_from;
    report.schema_violations = audit_payload(Trip::schema(), payload);

    let empty = Map::new();
    let object = payload.as_object().unwrap_or(&empty);

    let summary = field(object, &["summary"])
        .and_then(coerce_summary)
        .unwrap_or_else(|| {
            report.defaulted.push("summary");
            DEFAULT_SUMMARY.to_string()
        });

    let budget_breakdown = match field(object, &["budget_breakdown", "budgetBreakdown"]) {
        Some(Value::Object(categories)) => normalize_budget(categories),
        _ => {
            report.defaulted.push("budget_breakdown");
            BTreeMap::new()
        }
    };

    let accommodation = match field(object, &["accommodation"]) {
        Some(Value::Object(entry)) => normalize_accommodation(entry),
        Some(Value::String(name)) => Accommodation {
            name: name.trim().to_string(),
            ..Accommodation::default()
        },
        _ => {
            report.defaulted.push("accommodation");
            Accommodation::default()
        }
    };

    let itinerary = match field(object, &["itinerary"]) {
        Some(Value::Array(days)) => normalize_itinerary(days),
        _ => {
            report.defaulted.push("itinerary");
            Vec::new()
        }
    };

    let destination = field(object, &["destination"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    if !report.is_clean() {
        debug!(
            target: "trip_planner::normalize",
            unwrapped_from = ?report.unwrapped_from,
            defaulted = ?report.defaulted,
            violations = ?report.schema_violations,
            "payload repaired"
        );
    }

    let trip = Trip {
        summary,
        budget_breakdown,
        accommodation,
        itinerary,
        // Only enrichment attaches an image; a URL in the reply is never trusted.
        image: None,
        destination,
    };
    (trip, report)
}

/// Replace an envelope with the trip-shaped object nested one level inside it.
fn unwrap_envelope(payload: &Value) -> (&Value, Option<String>) {
    let Some(object) = payload.as_object() else {
        return (payload, None);
    };
    if object.contains_key("summary") {
        return (payload, None);
    }

    let looks_like_trip =
        |value: &Value| value.as_object().is_some_and(|inner| inner.contains_key("summary"));

    let preferred = ENVELOPE_KEYS
        .iter()
        .find_map(|key| object.get(*key).filter(|v| looks_like_trip(v)).map(|v| (*key, v)));
    let found = preferred.or_else(|| {
        object
            .iter()
            .find(|(_, value)| looks_like_trip(value))
            .map(|(key, value)| (key.as_str(), value))
    });

    match found {
        Some((key, inner)) => (inner, Some(key.to_string())),
        None => (payload, None),
    }
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn coerce_summary(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => return None,
        nested => serde_json::to_string_pretty(nested).ok()?,
    };
    (!text.is_empty()).then_some(text)
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Read a number, tolerating numeric strings such as `"$1,200"` or `"85.5 EUR"`.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let digits: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn normalize_budget(categories: &Map<String, Value>) -> BTreeMap<String, f64> {
    categories
        .iter()
        .filter_map(|(category, amount)| match coerce_number(Some(amount)) {
            Some(amount) => Some((category.clone(), amount.max(0.0))),
            None => {
                debug!(
                    target: "trip_planner::normalize",
                    category = %category,
                    "dropping non-numeric budget entry"
                );
                None
            }
        })
        .collect()
}

fn normalize_accommodation(entry: &Map<String, Value>) -> Accommodation {
    Accommodation {
        name: coerce_text(field(entry, &["name"])),
        price_per_night: coerce_number(field(entry, &["price_per_night", "pricePerNight"]))
            .unwrap_or(0.0),
        description: coerce_text(field(entry, &["description"])),
        lat: coerce_number(field(entry, &["lat"])),
        lng: coerce_number(field(entry, &["lng"])),
    }
}

fn normalize_itinerary(days: &[Value]) -> Vec<DayPlan> {
    days.iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(idx, entry)| {
            let position = idx as u32 + 1;
            let claimed = coerce_number(field(entry, &["day"]));
            if claimed.is_some_and(|day| day != f64::from(position)) {
                debug!(
                    target: "trip_planner::normalize",
                    claimed = ?claimed,
                    position,
                    "renumbering itinerary day"
                );
            }

            let details = match field(entry, &["details", "activities"]) {
                Some(Value::Array(items)) => items.iter().filter_map(normalize_activity).collect(),
                _ => Vec::new(),
            };

            DayPlan {
                day: position,
                summary: coerce_text(field(entry, &["summary", "title"])),
                estimated_cost: coerce_number(field(entry, &["estimated_cost", "estimatedCost"]))
                    .unwrap_or(0.0),
                details,
                lat: coerce_number(field(entry, &["lat"])),
                lng: coerce_number(field(entry, &["lng"])),
            }
        })
        .collect()
}

fn normalize_activity(item: &Value) -> Option<ActivityEntry> {
    match item {
        Value::String(activity) => Some(ActivityEntry {
            time: String::new(),
            activity: activity.trim().to_string(),
        }),
        Value::Object(entry) => Some(ActivityEntry {
            time: coerce_text(field(entry, &["time"])),
            activity: coerce_text(field(entry, &["activity", "description"])),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sanitizer::sanitize;
    use crate::types::PARSE_ERROR_SUMMARY;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "summary": "Three days of food and art",
            "budget_breakdown": { "lodging": 540, "food": 180.5 },
            "accommodation": {
                "name": "Hotel du Louvre",
                "price_per_night": 180,
                "description": "Central"
            },
            "itinerary": [
                {
                    "day": 1,
                    "summary": "Louvre",
                    "estimated_cost": 60,
                    "details": [{ "time": "Morning", "activity": "Visit Louvre Museum" }]
                }
            ]
        })
    }

    #[test]
    fn test_empty_object_gets_all_defaults() {
        let (trip, report) = normalize_with_report(&json!({}));
        assert_eq!(trip.summary, "No summary available");
        assert!(trip.budget_breakdown.is_empty());
        assert_eq!(trip.accommodation, Accommodation::default());
        assert!(trip.itinerary.is_empty());
        assert!(trip.image.is_none());
        assert_eq!(
            report.defaulted,
            vec!["summary", "budget_breakdown", "accommodation", "itinerary"]
        );
    }

    #[test]
    fn test_envelope_unwrap_matches_inner() {
        let wrapped = json!({ "ok": true, "data": sample() });
        let (trip, report) = normalize_with_report(&wrapped);
        assert_eq!(trip, normalize(&sample()));
        assert_eq!(report.unwrapped_from.as_deref(), Some("data"));
    }

    #[test]
    fn test_envelope_unwrap_under_unknown_key() {
        let wrapped = json!({ "status": "ok", "travelPlan": { "summary": "inner" } });
        assert_eq!(normalize(&wrapped).summary, "inner");
    }

    #[test]
    fn test_only_one_level_is_unwrapped() {
        let wrapped = json!({ "data": { "data": { "summary": "deep" } } });
        // The outer `data` has no summary, so nothing is unwrapped.
        assert_eq!(normalize(&wrapped).summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_top_level_summary_is_not_unwrapped() {
        let payload = json!({ "summary": "outer", "data": { "summary": "inner" } });
        assert_eq!(normalize(&payload).summary, "outer");
    }

    #[test]
    fn test_nested_summary_is_serialized() {
        let payload = json!({ "summary": { "overview": "Rome", "days": 3 } });
        let trip = normalize(&payload);
        assert!(trip.summary.contains("\"overview\": \"Rome\""));
    }

    #[test]
    fn test_blank_summary_defaults() {
        assert_eq!(normalize(&json!({ "summary": "   " })).summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_budget_coercion() {
        let trip = normalize(&json!({
            "summary": "x",
            "budgetBreakdown": { "food": "$1,200.5", "fun": -5, "vibes": "priceless" }
        }));
        assert_eq!(trip.budget_breakdown.get("food"), Some(&1200.5));
        assert_eq!(trip.budget_breakdown.get("fun"), Some(&0.0));
        assert!(!trip.budget_breakdown.contains_key("vibes"));
    }

    #[test]
    fn test_itinerary_is_renumbered_and_filtered() {
        let trip = normalize(&json!({
            "summary": "x",
            "itinerary": [
                { "day": 4, "summary": "First", "estimatedCost": "40" },
                "not a day",
                { "day": 2, "title": "Second", "details": ["Free afternoon", 7] }
            ]
        }));
        assert_eq!(trip.itinerary.len(), 2);
        assert_eq!(trip.itinerary[0].day, 1);
        assert_eq!(trip.itinerary[0].estimated_cost, 40.0);
        assert_eq!(trip.itinerary[1].day, 2);
        assert_eq!(trip.itinerary[1].summary, "Second");
        assert_eq!(trip.itinerary[1].details.len(), 1);
        assert_eq!(trip.itinerary[1].details[0].activity, "Free afternoon");
    }

    #[test]
    fn test_accommodation_accepts_camel_case_and_coordinates() {
        let trip = normalize(&json!({
            "summary": "x",
            "accommodation": { "name": "Inn", "pricePerNight": "95", "lat": 41.9, "lng": 12.5 }
        }));
        assert_eq!(trip.accommodation.price_per_night, 95.0);
        assert_eq!(trip.accommodation.lat, Some(41.9));
        assert_eq!(trip.accommodation.description, "");
    }

    #[test]
    fn test_non_object_payload_defaults() {
        let trip = normalize(&json!([1, 2, 3]));
        assert_eq!(trip, Trip::default());
    }

    #[test]
    fn test_parse_failure_yields_marker_trip() {
        let trip = normalize_response(sanitize("no json here"));
        assert_eq!(trip.summary, PARSE_ERROR_SUMMARY);
        assert!(trip.itinerary.is_empty());
    }

    #[test]
    fn test_clean_payload_reports_clean() {
        let (_, report) = normalize_with_report(&sample());
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_image_from_payload_is_ignored() {
        let trip = normalize(&json!({
            "summary": "x",
            "image": "https://made-up.example/a.jpg"
        }));
        assert_eq!(trip.image, None);
    }
}
