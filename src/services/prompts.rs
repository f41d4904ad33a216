use serde_json::{json, Value};

use crate::types::{Trip, TripRequest};

const SYSTEM_PROMPT: &str = "You are a travel planner. Reply with a single JSON object and nothing else. \
The object MUST have exactly these keys: \
\"summary\" (string), \
\"budget_breakdown\" (object mapping category name to a number), \
\"accommodation\" (object with \"name\", \"price_per_night\" and \"description\"), \
\"itinerary\" (array of days, each with \"day\", \"summary\", \"estimated_cost\" and \
\"details\", an array of {\"time\", \"activity\"}).";

/// Messages asking for a fresh trip plan.
pub fn generation_messages(request: &TripRequest) -> Vec<Value> {
    vec![
        json!({ "role": "system", "content": SYSTEM_PROMPT }),
        json!({ "role": "user", "content": describe_request(request) }),
    ]
}

/// Messages asking for a revision of `current` according to `feedback`.
pub fn refinement_messages(current: &Trip, feedback: &str, request: &TripRequest) -> Vec<Value> {
    let current_json = serde_json::to_string(current).unwrap_or_else(|_| "{}".to_string());
    vec![
        json!({ "role": "system", "content": SYSTEM_PROMPT }),
        json!({ "role": "user", "content": describe_request(request) }),
        json!({ "role": "assistant", "content": current_json }),
        json!({
            "role": "user",
            "content": format!(
                "Revise the plan according to this feedback: {}\n\nKeep the same four keys \
                 (summary, budget_breakdown, accommodation, itinerary) and return the complete plan.",
                feedback.trim()
            )
        }),
    ]
}

fn describe_request(request: &TripRequest) -> String {
    let mut lines = vec![format!(
        "Plan a {}-day trip to {}.",
        request.days.max(1),
        request.destination.trim()
    )];

    if let Some(start) = request.start_date {
        lines.push(format!("The trip starts on {}.", start.format("%Y-%m-%d")));
    }
    if let Some(season) = request.season() {
        lines.push(format!("Price everything for {} travel.", season));
    }
    if let Some(travelers) = request.travelers {
        lines.push(format!("Travelers: {}.", travelers));
    }
    if let Some(budget) = request.budget {
        let currency = request.currency.as_deref().unwrap_or("USD");
        lines.push(format!("Total budget: {:.0} {}.", budget, currency));
    }
    if !request.preferences.is_empty() {
        lines.push(format!("Preferences: {}.", request.preferences.join(", ")));
    }

    lines.join("\n")
}
