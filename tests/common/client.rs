//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all moodify-server endpoints.
//!
//! When API routes or request formats change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POSTs an arbitrary JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// POSTs a raw body without setting a content type.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Response {
        self.client
            .post(self.url(path))
            .body(body)
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    pub async fn ping(&self) -> Response {
        self.get("/ping").await
    }

    pub async fn get_emotions(&self) -> Response {
        self.get("/emotions").await
    }

    // ========================================================================
    // Emotion detection
    // ========================================================================

    pub async fn detect_text(&self, text: &str) -> Response {
        self.post_json("/text", &json!({ "text": text })).await
    }

    pub async fn detect_webcam(&self, image: &str) -> Response {
        self.post_json("/webcam", &json!({ "image": image })).await
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    pub async fn recommend(&self, emotion: &str) -> Response {
        self.get(&format!("/recommend/{}", emotion)).await
    }

    pub async fn recommend_text(&self, text: &str) -> Response {
        self.post_json("/recommend/text", &json!({ "text": text }))
            .await
    }

    pub async fn recommend_webcam(&self, image: &str) -> Response {
        self.post_json("/recommend/webcam", &json!({ "image": image }))
            .await
    }

    /// Song name of a `/recommend/{emotion}` answer, `None` for a null song.
    pub async fn recommended_song_name(&self, emotion: &str) -> Option<String> {
        let body: Value = self.recommend(emotion).await.json().await.unwrap();
        body["song"]["song_name"].as_str().map(str::to_string)
    }
}
