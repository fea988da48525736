use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::emotion::EmotionLabel;

/// Metric name prefix for all Moodify metrics
const PREFIX: &str = "moodify";

const OTHER_EMOTION: &str = "other";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Emotion detection
    pub static ref TEXT_CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_text_classifications_total"), "Text classifications by label"),
        &["label"]
    ).expect("Failed to create text_classifications_total metric");

    pub static ref FACE_DETECTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_face_detections_total"), "Facial detections by outcome"),
        &["outcome"]
    ).expect("Failed to create face_detections_total metric");

    // Recommendations
    pub static ref RECOMMENDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_recommendations_total"), "Recommendations by emotion and outcome"),
        &["emotion", "outcome"]
    ).expect("Failed to create recommendations_total metric");

    pub static ref CATALOG_SONGS: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_catalog_songs"), "Catalog songs per emotion"),
        &["emotion"]
    ).expect("Failed to create catalog_songs metric");

    // Background jobs
    pub static ref KEEP_ALIVE_PINGS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_keep_alive_pings_total"), "Keep-alive pings by outcome"),
        &["outcome"]
    ).expect("Failed to create keep_alive_pings_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(TEXT_CLASSIFICATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(FACE_DETECTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_SONGS.clone()));
    let _ = REGISTRY.register(Box::new(KEEP_ALIVE_PINGS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn init_catalog_metrics(catalog: &crate::catalog::Catalog) {
    for entry in catalog.emotions() {
        CATALOG_SONGS
            .with_label_values(&[entry.emotion.as_str()])
            .set(entry.songs as f64);
    }
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_text_classification(label: &str) {
    TEXT_CLASSIFICATIONS_TOTAL.with_label_values(&[label]).inc();
}

pub fn record_face_detection(degraded: bool) {
    let outcome = if degraded { "fallback" } else { "detected" };
    FACE_DETECTIONS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Emotions outside the label set and the catalog are counted as `other`.
pub fn record_recommendation(emotion: &str, found: bool) {
    let outcome = if found { "found" } else { "not_found" };
    let emotion = if found {
        emotion.trim().to_lowercase()
    } else {
        match emotion.parse::<EmotionLabel>() {
            Ok(label) => label.as_str().to_string(),
            Err(_) => OTHER_EMOTION.to_string(),
        }
    };
    RECOMMENDATIONS_TOTAL
        .with_label_values(&[emotion.as_str(), outcome])
        .inc();
}

pub fn record_keep_alive_ping(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    KEEP_ALIVE_PINGS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Collapses path parameters so that the `path` label stays low-cardinality.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/ping" => "/ping",
        "/text" => "/text",
        "/webcam" => "/webcam",
        "/emotions" => "/emotions",
        "/recommend/text" => "/recommend/text",
        "/recommend/webcam" => "/recommend/webcam",
        p if p.starts_with("/recommend/") => "/recommend/{emotion}",
        _ => "other",
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
