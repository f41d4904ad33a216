//! Rewrites proper-noun-like phrases in activity text into search links.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::types::{DayPlan, Trip};

static SEARCH_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://www.google.com/search").unwrap());

/// Two to five consecutive capitalised words. A word may carry internal
/// apostrophes or hyphens ("Sacré-Cœur", "O'Connell").
static RE_PROPER_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b\p{Lu}[\p{L}\p{M}]*(?:['’-][\p{L}\p{M}]+)*(?:[ \t]+\p{Lu}[\p{L}\p{M}]*(?:['’-][\p{L}\p{M}]+)*){1,4}",
    )
    .unwrap()
});

/// One itinerary day with its activity text rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedDay {
    pub day: u32,
    pub summary: String,
    pub activities: Vec<AnnotatedActivity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedActivity {
    pub time: String,
    pub html: String,
}

/// Links capitalised phrases to a web search scoped by the trip destination.
#[derive(Debug, Clone, Default)]
pub struct Linkifier {
    destination: Option<String>,
}

impl Linkifier {
    pub fn new(destination: Option<&str>) -> Self {
        Self {
            destination: destination
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }

    pub fn for_trip(trip: &Trip) -> Self {
        Self::new(trip.destination.as_deref())
    }

    /// Replace each qualifying phrase in `text` with an anchor.
    ///
    /// Phrases are only looked for after the first whitespace-delimited token,
    /// so a capitalised leading word is never part of a link.
    pub fn linkify(&self, text: &str) -> String {
        let skip = first_token_end(text);
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..skip]);

        let rest = &text[skip..];
        let mut last = 0;
        for found in RE_PROPER_PHRASE.find_iter(rest) {
            out.push_str(&rest[last..found.start()]);
            out.push_str(&self.anchor(found.as_str()));
            last = found.end();
        }
        out.push_str(&rest[last..]);
        out
    }

    /// Search URL for a phrase, suffixed with the destination when known.
    pub fn search_url(&self, phrase: &str) -> String {
        let query = match &self.destination {
            Some(destination) => format!("{} {}", phrase, destination),
            None => phrase.to_string(),
        };
        let mut url = SEARCH_BASE.clone();
        url.query_pairs_mut().append_pair("q", &query);
        url.to_string()
    }

    fn anchor(&self, phrase: &str) -> String {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            self.search_url(phrase),
            phrase
        )
    }

    pub fn annotate_day(&self, day: &DayPlan) -> AnnotatedDay {
        AnnotatedDay {
            day: day.day,
            summary: day.summary.clone(),
            activities: day
                .details
                .iter()
                .map(|entry| AnnotatedActivity {
                    time: entry.time.clone(),
                    html: self.linkify(&entry.activity),
                })
                .collect(),
        }
    }
}

/// Annotate every activity in the trip's itinerary; other fields are untouched.
pub fn annotate_itinerary(trip: &Trip) -> Vec<AnnotatedDay> {
    let linkifier = Linkifier::for_trip(trip);
    trip.itinerary
        .iter()
        .map(|day| linkifier.annotate_day(day))
        .collect()
}

/// Byte offset just past the first whitespace-delimited token.
fn first_token_end(text: &str) -> usize {
    let start = text.len() - text.trim_start().len();
    text[start..]
        .find(char::is_whitespace)
        .map_or(text.len(), |offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityEntry;

    #[test]
    fn test_links_phrase_but_not_leading_word() {
        let html = Linkifier::new(Some("Paris")).linkify("Visit Eiffel Tower today");
        assert!(html.starts_with("Visit <a href="));
        assert!(html.ends_with(">Eiffel Tower</a> today"));
        assert!(html.contains("q=Eiffel+Tower+Paris"));
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_text_without_phrases_is_unchanged() {
        let linkifier = Linkifier::new(Some("Paris"));
        for text in ["walk along the river", "Lunch at a bistro", "", "   "] {
            assert_eq!(linkifier.linkify(text), text);
        }
    }

    #[test]
    fn test_single_capitalised_word_is_not_linked() {
        let text = "Morning stroll through Montmartre";
        assert_eq!(Linkifier::new(None).linkify(text), text);
    }

    #[test]
    fn test_diacritics_and_hyphens() {
        let html = Linkifier::new(Some("Paris")).linkify("Then climb to Sacré-Cœur Basilica");
        assert!(html.contains(">Sacré-Cœur Basilica</a>"));
        assert!(html.contains("Sacr%C3%A9-C%C5%93ur"));
    }

    #[test]
    fn test_apostrophes_inside_words() {
        let html = Linkifier::new(Some("Dublin")).linkify("Stop by O'Connell Street bridge");
        assert!(html.contains(">O'Connell Street</a>"));
    }

    #[test]
    fn test_phrase_longer_than_five_words_is_split() {
        let html = Linkifier::new(None).linkify("see Alpha Beta Gamma Delta Epsilon Zeta Eta");
        assert!(html.contains(">Alpha Beta Gamma Delta Epsilon</a>"));
        assert!(html.contains(">Zeta Eta</a>"));
    }

    #[test]
    fn test_surrounding_punctuation_preserved() {
        let html = Linkifier::new(None).linkify("Dinner (at Le Comptoir), then bed.");
        assert!(html.contains("(at <a "));
        assert!(html.contains(">Le Comptoir</a>), then bed."));
    }

    #[test]
    fn test_leading_whitespace_is_not_a_token() {
        let html = Linkifier::new(None).linkify("  Tour Notre Dame");
        assert!(html.starts_with("  Tour <a "));
        assert!(html.contains(">Notre Dame</a>"));
    }

    #[test]
    fn test_search_url_without_destination() {
        assert_eq!(
            Linkifier::new(None).search_url("Eiffel Tower"),
            "https://www.google.com/search?q=Eiffel+Tower"
        );
    }

    #[test]
    fn test_annotate_itinerary_only_touches_activities() {
        let mut trip = Trip::with_summary("Visit Eiffel Tower soon");
        trip.destination = Some("Paris".to_string());
        trip.itinerary.push(DayPlan {
            day: 1,
            summary: "Left Bank Walk".to_string(),
            details: vec![ActivityEntry {
                time: "Morning".to_string(),
                activity: "Visit Eiffel Tower".to_string(),
            }],
            ..DayPlan::default()
        });

        let days = annotate_itinerary(&trip);
        assert_eq!(days[0].summary, "Left Bank Walk");
        assert_eq!(days[0].activities[0].time, "Morning");
        assert!(days[0].activities[0].html.contains(">Eiffel Tower</a>"));
    }
}
