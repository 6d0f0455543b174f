//! Geocoding client against a mock address API

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use concert_chaussettes::config::GeocodingConfig;
use concert_chaussettes::services::GeocodingService;
use concert_chaussettes::utils::errors::GeocodingError;

fn service(server: &MockServer) -> GeocodingService {
    GeocodingService::new(&GeocodingConfig {
        enabled: true,
        api_url: format!("{}/", server.uri()),
        timeout_seconds: 2,
    })
    .expect("Failed to build geocoding client")
}

#[tokio::test]
async fn test_first_feature_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("q", "Lyon"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [4.8357, 45.764] }, "properties": { "label": "Lyon" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let point = service(&server).geocode("Lyon").await.unwrap();

    assert!((point.latitude - 45.764).abs() < 1e-9);
    assert!((point.longitude - 4.8357).abs() < 1e-9);
}

#[tokio::test]
async fn test_empty_collection_is_no_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "FeatureCollection", "features": [] })))
        .mount(&server)
        .await;

    assert_matches!(service(&server).geocode("Nulle part").await, Err(GeocodingError::NoMatch(_)));
}

#[tokio::test]
async fn test_server_error_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    assert_matches!(service(&server).geocode("Lyon").await, Err(GeocodingError::RequestFailed(msg)) if msg.contains("503"));
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert_matches!(service(&server).geocode("Lyon").await, Err(GeocodingError::InvalidResponse(_)));
}
