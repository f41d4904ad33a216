use crate::{
    error::{PlannerError, Result},
    schemas::{CompletionSchema, SchemaHandle},
};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::warn;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Check a raw payload against a schema and describe what does not conform.
///
/// This is diagnostic only: the normalizer repairs the payload regardless, so
/// an empty result means "nothing to repair", not "accepted".
pub fn audit_payload(schema: &SchemaHandle, payload: &Value) -> Vec<String> {
    let validator = match JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema.schema_json())
    {
        Ok(validator) => validator,
        Err(err) => {
            warn!(
                target: "trip_planner::schema",
                schema = schema.schema_name(),
                error = %err,
                "failed to prepare schema for audit"
            );
            return Vec::new();
        }
    };

    let mut details = Vec::new();
    if let Err(errors) = validator.validate(payload) {
        for (idx, error) in errors.enumerate() {
            if idx == MAX_SCHEMA_ERRORS {
                details.push("additional errors truncated".to_string());
                break;
            }
            let mut path = error.instance_path.to_string();
            if path.is_empty() {
                path = "<root>".to_string();
            }
            details.push(format!("{}: {}", path, error));
        }
    }
    details
}

/// Strictly decode an already-normalized record, reporting the failing path.
pub fn decode_strict<T>(raw: &str) -> Result<T>
where
    T: CompletionSchema,
{
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() {
            "<root>".to_string()
        } else {
            path
        };
        PlannerError::Validation(format!(
            "failed to deserialize `{}` at {}: {}",
            T::schema().schema_name(),
            location,
            err.inner()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trip;
    use serde_json::json;

    #[test]
    fn test_audit_flags_wrong_types() {
        let payload = json!({
            "summary": { "text": "nested" },
            "budget_breakdown": {},
            "accommodation": { "name": "Hotel", "price_per_night": 100, "description": "" },
            "itinerary": []
        });
        let violations = audit_payload(Trip::schema(), &payload);
        assert!(!violations.is_empty());
        assert!(violations[0].contains("summary"));
    }

    #[test]
    fn test_decode_strict_reports_path() {
        let raw = r#"{"summary":"s","budget_breakdown":{},"accommodation":{"name":"h","price_per_night":"cheap","description":""},"itinerary":[]}"#;
        let err = decode_strict::<Trip>(raw).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("accommodation.price_per_night"));
    }
}
