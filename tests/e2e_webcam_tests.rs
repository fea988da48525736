//! End-to-end tests for facial emotion detection (`POST /webcam`)

mod common;

use common::{FixedFaceAnalyzer, TestClient, TestServer, PNG_BASE64};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::test]
async fn test_detected_emotion_is_returned() {
    let server = TestServer::spawn_with_face_analyzer(Arc::new(FixedFaceAnalyzer("angry"))).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.detect_webcam(PNG_BASE64).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"emotion": "angry"})
    );
}

#[tokio::test]
async fn test_data_url_payload_is_accepted() {
    let server = TestServer::spawn_with_face_analyzer(Arc::new(FixedFaceAnalyzer("surprise"))).await;
    let client = TestClient::new(server.base_url.clone());

    let payload = format!("data:image/png;base64,{}", PNG_BASE64);
    let body: Value = client.detect_webcam(&payload).await.json().await.unwrap();
    assert_eq!(body, json!({"emotion": "surprise"}));
}

#[tokio::test]
async fn test_undecodable_image_degrades_to_neutral() {
    let server = TestServer::spawn_with_face_analyzer(Arc::new(FixedFaceAnalyzer("happy"))).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.detect_webcam("definitely not base64!").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["emotion"], "neutral");
    assert!(body["warning"]
        .as_str()
        .unwrap()
        .starts_with("Image could not be decoded"));
}

#[tokio::test]
async fn test_unavailable_analyzer_degrades_to_neutral() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.detect_webcam(PNG_BASE64).await.json().await.unwrap();
    assert_eq!(body["emotion"], "neutral");
    assert!(body["warning"]
        .as_str()
        .unwrap()
        .starts_with("Facial analysis failed"));
}

#[tokio::test]
async fn test_missing_image_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for body in [json!({}), json!({"image": ""}), json!({"photo": PNG_BASE64})] {
        let response = client.post_json("/webcam", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({"error": "Image not provided"})
        );
    }
}
