use serde_json::json;
use tempfile::tempdir;
use trip_planner_rs::{
    render::{self, DirectorySink},
    schemas::{audit_payload, decode_strict},
    CompletionSchema, PlannerError, Trip,
};

fn saved_trip() -> serde_json::Value {
    json!({
        "summary": "A week in Kyoto",
        "budget_breakdown": { "lodging": 700.0, "food": 250.0 },
        "accommodation": {
            "name": "Ryokan Sawaya",
            "price_per_night": 100.0,
            "description": "Tatami rooms near Gion"
        },
        "itinerary": [
            {
                "day": 1,
                "summary": "Fushimi Inari",
                "estimated_cost": 15.0,
                "details": [{ "time": "Morning", "activity": "Walk the torii gates" }]
            }
        ],
        "destination": "Kyoto, Japan"
    })
}

#[test]
fn test_trip_schema_is_named() {
    let schema = Trip::schema();
    assert_eq!(schema.schema_name(), "trip");
    assert!(schema.schema_json().get("properties").is_some());
}

#[test]
fn test_saved_trip_passes_audit_and_decodes() {
    let payload = saved_trip();
    assert!(audit_payload(Trip::schema(), &payload).is_empty());

    let trip: Trip = decode_strict(&payload.to_string()).unwrap();
    assert_eq!(trip.itinerary[0].details[0].activity, "Walk the torii gates");
    assert_eq!(trip.total_budget(), 950.0);
}

#[test]
fn test_decode_strict_points_at_bad_field() {
    let mut payload = saved_trip();
    payload["itinerary"][0]["estimated_cost"] = json!("cheap");

    let err = decode_strict::<Trip>(&payload.to_string()).unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));
    assert!(err.to_string().contains("itinerary[0].estimated_cost"));
}

#[tokio::test]
async fn test_export_writes_pdf_to_directory() {
    let dir = tempdir().unwrap();
    let trip: Trip = decode_strict(&saved_trip().to_string()).unwrap();

    let location = render::export(&trip, &DirectorySink::new(dir.path()))
        .await
        .unwrap();

    let path = dir.path().join("kyoto-japan-trip-plan.pdf");
    assert_eq!(location, path.display().to_string());
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[tokio::test]
async fn test_export_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("out").join("plans");

    let location = render::export(&Trip::default(), &DirectorySink::new(&nested))
        .await
        .unwrap();

    assert!(location.ends_with("trip-plan.pdf"));
    assert!(nested.join("trip-plan.pdf").exists());
}
