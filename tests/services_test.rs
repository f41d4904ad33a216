use std::sync::Arc;

use mockito::Matcher;
use serde_json::json;
use trip_planner_rs::{
    services::{
        DisabledGeocoder, DisabledImageSearch, GoogleGeocoder, OpenAIClient, UnsplashImageSearch,
    },
    Enricher, GenerationSource, GeocodeResolver, ImageSearch, PlannerError, TripPlanner,
    TripRequest,
};

#[tokio::test]
async fn test_geocoder_returns_first_location() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("address".into(), "Louvre, Paris".into()),
            Matcher::UrlEncoded("key".into(), "maps-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "OK",
                "results": [
                    { "geometry": { "location": { "lat": 48.8606, "lng": 2.3376 } } },
                    { "geometry": { "location": { "lat": 0.0, "lng": 0.0 } } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let geocoder = GoogleGeocoder::new("maps-key").with_base_url(server.url());
    let coords = geocoder.resolve("Louvre, Paris").await.unwrap().unwrap();

    assert_eq!(coords.lat, 48.8606);
    assert_eq!(coords.lng, 2.3376);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_geocoder_zero_results_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status": "ZERO_RESULTS", "results": []}"#)
        .create_async()
        .await;

    let geocoder = GoogleGeocoder::new("maps-key").with_base_url(server.url());
    assert_eq!(geocoder.resolve("Atlantis").await.unwrap(), None);
}

#[tokio::test]
async fn test_geocoder_denied_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status": "REQUEST_DENIED", "error_message": "bad key", "results": []}"#)
        .create_async()
        .await;

    let geocoder = GoogleGeocoder::new("wrong").with_base_url(server.url());
    let err = geocoder.resolve("Louvre, Paris").await.unwrap_err();

    assert!(matches!(err, PlannerError::Collaborator(_)));
    assert!(err.to_string().contains("REQUEST_DENIED"));
}

#[tokio::test]
async fn test_unsplash_search_maps_urls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/photos")
        .match_header("authorization", "Client-ID unsplash-key")
        .match_header("accept-version", "v1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "Kyoto autumn temples".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("per_page".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "total": 2,
                "results": [
                    { "id": "a", "urls": { "full": "https://img/a-full", "regular": "https://img/a" } },
                    { "id": "b", "urls": { "regular": "https://img/b" } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let search = UnsplashImageSearch::new("unsplash-key").with_base_url(server.url());
    let results = search.search("Kyoto autumn temples", 2).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].best_url(), Some("https://img/a-full"));
    assert_eq!(results[1].best_url(), Some("https://img/b"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unsplash_unauthorized_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search/photos")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"errors": ["OAuth error: The access token is invalid"]}"#)
        .create_async()
        .await;

    let search = UnsplashImageSearch::new("bad").with_base_url(server.url());
    let err = search.search("Paris", 1).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_openai_client_requests_json_object() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(r#"{"summary": "Hi"}"#))
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test")
        .with_base_url(server.url())
        .with_model("test-model");
    let content = client
        .complete(vec![json!({ "role": "user", "content": "plan" })])
        .await
        .unwrap();

    assert_eq!(content, r#"{"summary": "Hi"}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_client_reports_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .with_body(r#"{"error": {"message": "model not found"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.url());
    let err = client
        .complete(vec![json!({ "role": "user", "content": "plan" })])
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "GENERATION_ERROR");
    assert!(err.to_string().contains("model not found"));
}

#[tokio::test]
async fn test_planner_over_http_source() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(
            "```json\n{\"summary\": \"Lisbon by tram\", \"itinerary\": [{\"day\": 1, \"summary\": \"Alfama\"}]}\n```",
        ))
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.url());
    let planner = TripPlanner::new(
        Arc::new(client),
        Enricher::new(Arc::new(DisabledGeocoder), Arc::new(DisabledImageSearch)),
    );

    let trip = planner.generate(&TripRequest::new("Lisbon", 1)).await.unwrap();
    assert_eq!(trip.summary, "Lisbon by tram");
    assert_eq!(trip.itinerary[0].summary, "Alfama");
    assert_eq!(trip.destination.as_deref(), Some("Lisbon"));
    assert_eq!(trip.image, None);
}
