use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Traveller input a trip is generated from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripRequest {
    /// Destination city and country (e.g., "Paris, France")
    pub destination: String,
    /// First day of the trip
    pub start_date: Option<NaiveDate>,
    /// Number of itinerary days requested
    pub days: u32,
    pub travelers: Option<u32>,
    /// Total budget in `currency`
    pub budget: Option<f64>,
    pub currency: Option<String>,
    /// Free-form preference tags ("museums", "hiking", ...)
    pub preferences: Vec<String>,
}

impl TripRequest {
    pub fn new(destination: impl Into<String>, days: u32) -> Self {
        Self {
            destination: destination.into(),
            days,
            ..Self::default()
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_travelers(mut self, travelers: u32) -> Self {
        self.travelers = Some(travelers);
        self
    }

    pub fn with_budget(mut self, budget: f64, currency: Option<String>) -> Self {
        self.budget = Some(budget);
        self.currency = currency;
        self
    }

    pub fn with_preferences<I, S>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences = preferences.into_iter().map(Into::into).collect();
        self
    }

    /// Season of the trip's start month, if a start date was given.
    pub fn season(&self) -> Option<Season> {
        self.start_date
            .map(|date| Season::from_month0(date.month0()))
    }

    /// Destination with surrounding whitespace removed, `None` when blank.
    pub fn destination_hint(&self) -> Option<&str> {
        let trimmed = self.destination.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Calendar bucket used to bias image search and pricing assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Bucket a zero-based month: 0–1 winter, 2–4 spring, 5–7 summer, 8–11 autumn.
    pub fn from_month0(month0: u32) -> Self {
        match month0 {
            0..=1 => Season::Winter,
            2..=4 => Season::Spring,
            5..=7 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_buckets() {
        let expected = [
            (0, Season::Winter),
            (1, Season::Winter),
            (2, Season::Spring),
            (4, Season::Spring),
            (5, Season::Summer),
            (7, Season::Summer),
            (8, Season::Autumn),
            (11, Season::Autumn),
        ];
        for (month0, season) in expected {
            assert_eq!(Season::from_month0(month0), season, "month0 {month0}");
        }
    }

    #[test]
    fn test_request_season_uses_start_month() {
        let request = TripRequest::new("Kyoto", 4)
            .with_start_date(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
        assert_eq!(request.season(), Some(Season::Spring));
        assert_eq!(TripRequest::new("Kyoto", 4).season(), None);
    }

    #[test]
    fn test_blank_destination_has_no_hint() {
        assert_eq!(TripRequest::new("  ", 1).destination_hint(), None);
        assert_eq!(
            TripRequest::new(" Lisbon ", 1).destination_hint(),
            Some("Lisbon")
        );
    }
}
