//! End-to-end tests for status endpoints and cross-cutting HTTP behavior
//!
//! Tests `/`, `/ping`, `/emotions`, CORS and unknown routes.

mod common;

use common::{TestClient, TestServer, CATALOG_SONG_COUNT};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_home_reports_running_service() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Moodify API is running!");
    assert_eq!(body["songs"], CATALOG_SONG_COUNT);
    assert!(body["uptime"].is_string());
    assert!(body["hash"].is_string());
}

#[tokio::test]
async fn test_ping_is_alive() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.ping().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"status": "alive"})
    );
}

#[tokio::test]
async fn test_emotions_lists_labels_and_catalog_counts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.get_emotions().await.json().await.unwrap();
    assert_eq!(
        body["labels"],
        json!(["happy", "sad", "angry", "fear", "surprise", "disgust", "love", "neutral"])
    );
    assert_eq!(
        body["catalog"],
        json!([
            {"emotion": "angry", "songs": 2},
            {"emotion": "happy", "songs": 3},
            {"emotion": "love", "songs": 1},
            {"emotion": "neutral", "songs": 1},
            {"emotion": "sad", "songs": 1},
        ])
    );
}

#[tokio::test]
async fn test_every_response_allows_any_origin() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let responses = vec![
        client.ping().await,
        client.detect_text("").await,
        client.recommend("happy").await,
        client.post_raw("/text", "{broken").await,
    ];

    for response in responses {
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("*"),
            "missing CORS header on {} response",
            response.status()
        );
    }
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .request(reqwest::Method::OPTIONS, format!("{}/text", server.base_url))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .get(format!("{}/does/not/exist", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"error": "Not found"})
    );
}
