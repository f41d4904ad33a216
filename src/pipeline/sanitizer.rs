//! Recovery of a decodable JSON payload from free-form model output.
//!
//! Models wrap the object they were asked for in prose, code fences or a
//! leading `json` label, and now and then leave a trailing comma behind. The
//! cleanup runs in a fixed order and every step is a no-op on clean input:
//!
//! 1. Drop a leading `json` label (any case)
//! 2. Drop code-fence delimiters anywhere in the text
//! 3. Keep only the span from the first `{` to the last `}`
//! 4. Drop commas that directly precede `}` or `]`
//! 5. Decode
//!
//! Text holding two sibling objects, or stray braces in surrounding prose, is
//! bounded by the outermost braces and usually fails to decode. That case is
//! reported as a [`ParseFailure`] rather than guessed at.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Outcome of sanitizing one response: the decoded payload, or the raw text.
pub type ParseResult = std::result::Result<Value, ParseFailure>;

/// The response held no decodable payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not extract a structured payload: {reason}")]
pub struct ParseFailure {
    /// The response text exactly as received
    pub raw: String,
    pub reason: String,
}

impl ParseFailure {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

static RE_LEADING_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\A\s*json\b").unwrap());

static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z]*").unwrap());

static RE_TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Extract and decode the structured payload embedded in `raw`.
pub fn sanitize(raw: &str) -> ParseResult {
    let Some(candidate) = clean(raw) else {
        debug!(target: "trip_planner::sanitize", len = raw.len(), "no braced payload found");
        return Err(ParseFailure::new(raw, "no `{ ... }` span in response"));
    };

    serde_json::from_str::<Value>(&candidate).map_err(|err| {
        debug!(
            target: "trip_planner::sanitize",
            error = %err,
            candidate = %candidate,
            "payload did not decode"
        );
        ParseFailure::new(raw, err.to_string())
    })
}

/// Apply the text-level repairs (steps 1–4) without decoding.
///
/// Returns `None` when no brace-bounded span exists.
pub fn clean(raw: &str) -> Option<String> {
    let text = strip_leading_label(raw);
    let text = strip_fences(text);
    let bounded = bound_to_braces(&text)?;
    Some(remove_trailing_commas(bounded))
}

fn strip_leading_label(input: &str) -> &str {
    match RE_LEADING_LABEL.find(input) {
        Some(label) => &input[label.end()..],
        None => input,
    }
}

fn strip_fences(input: &str) -> String {
    RE_FENCE.replace_all(input, "").into_owned()
}

fn bound_to_braces(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    (end > start).then(|| &input[start..=end])
}

fn remove_trailing_commas(input: &str) -> String {
    RE_TRAILING_COMMA.replace_all(input, "$1").into_owned()
}
