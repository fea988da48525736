use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use super::{
    error::{ApiError, ErrorBody},
    log_requests,
    metrics::{self, metrics_handler},
    state::*,
    validation::{ImageRequest, TextRequest, ValidatedJson},
    ServerConfig,
};
use crate::catalog::{Catalog, EmotionCount, Song};
use crate::emotion::{classify, detect_face_emotion, EmotionLabel, KEYWORD_CLASSIFIER_SCORE};
use crate::recommend::{no_songs_message, Recommender};

#[derive(Serialize)]
struct ServerStats {
    pub message: &'static str,
    pub uptime: String,
    pub hash: String,
    pub songs: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct PingResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct TextEmotionResponse {
    emotion: EmotionLabel,
    score: f64,
}

#[derive(Serialize)]
struct RecommendationResponse {
    emotion: String,
    /// Only set for text recommendations.
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    song: Option<Song>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl RecommendationResponse {
    fn new(recommender: &Recommender, emotion: String) -> RecommendationResponse {
        let song = recommender.recommend(&emotion);
        let message = match song {
            Some(_) => None,
            None => Some(no_songs_message(&emotion)),
        };
        RecommendationResponse {
            emotion,
            score: None,
            song,
            warning: None,
            message,
        }
    }
}

#[derive(Serialize)]
struct EmotionsResponse {
    labels: Vec<&'static str>,
    catalog: Vec<EmotionCount>,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        message: "Moodify API is running!",
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        songs: state.recommender.catalog().len(),
    };
    Json(stats)
}

async fn ping() -> impl IntoResponse {
    Json(PingResponse { status: "alive" })
}

fn classify_text(text: &str) -> EmotionLabel {
    let label = classify(text);
    metrics::record_text_classification(label.as_str());
    label
}

async fn text_emotion(
    ValidatedJson(body): ValidatedJson<TextRequest>,
) -> Result<Json<TextEmotionResponse>, ApiError> {
    let emotion = classify_text(&body.text);
    Ok(Json(TextEmotionResponse {
        emotion,
        score: KEYWORD_CLASSIFIER_SCORE,
    }))
}

async fn webcam_emotion(
    State(face_analyzer): State<GuardedFaceAnalyzer>,
    ValidatedJson(body): ValidatedJson<ImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let detection = detect_face_emotion(face_analyzer.as_ref(), &body.image).await;
    metrics::record_face_detection(detection.warning.is_some());
    Ok(Json(detection))
}

async fn recommend_for_emotion(
    State(recommender): State<GuardedRecommender>,
    Path(emotion): Path<String>,
) -> impl IntoResponse {
    Json(RecommendationResponse::new(&recommender, emotion))
}

async fn recommend_for_text(
    State(recommender): State<GuardedRecommender>,
    ValidatedJson(body): ValidatedJson<TextRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let emotion = classify_text(&body.text);
    let mut response = RecommendationResponse::new(&recommender, emotion.to_string());
    response.score = Some(KEYWORD_CLASSIFIER_SCORE);
    Ok(Json(response))
}

async fn recommend_for_webcam(
    State(recommender): State<GuardedRecommender>,
    State(face_analyzer): State<GuardedFaceAnalyzer>,
    ValidatedJson(body): ValidatedJson<ImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let detection = detect_face_emotion(face_analyzer.as_ref(), &body.image).await;
    metrics::record_face_detection(detection.warning.is_some());
    let mut response = RecommendationResponse::new(&recommender, detection.emotion);
    response.warning = detection.warning;
    Ok(Json(response))
}

async fn emotions(State(recommender): State<GuardedRecommender>) -> impl IntoResponse {
    Json(EmotionsResponse {
        labels: EmotionLabel::ALL.iter().map(|label| label.as_str()).collect(),
        catalog: recommender.catalog().emotions(),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
        }),
    )
}

pub fn make_app(
    config: ServerConfig,
    recommender: GuardedRecommender,
    face_analyzer: GuardedFaceAnalyzer,
) -> Router {
    let state = ServerState::new(config.clone(), recommender, face_analyzer);

    let emotion_routes: Router = Router::new()
        .route("/text", post(text_emotion))
        .route("/webcam", post(webcam_emotion))
        .route("/emotions", get(emotions))
        .with_state(state.clone());

    let recommend_routes: Router = Router::new()
        .route("/text", post(recommend_for_text))
        .route("/webcam", post(recommend_for_webcam))
        .route("/{emotion}", get(recommend_for_emotion))
        .with_state(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/ping", get(ping))
        .with_state(state.clone())
        .merge(emotion_routes)
        .nest("/recommend", recommend_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_image_bytes))
        .layer(middleware::from_fn_with_state(state, log_requests))
        .layer(cors)
}

async fn serve_metrics(address: String, port: u16, shutdown: CancellationToken) -> Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener = TcpListener::bind((address.as_str(), port))
        .await
        .with_context(|| format!("Could not bind metrics listener to {}:{}", address, port))?;
    info!("Metrics available at {}:{}/metrics", address, port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

pub async fn run_server(
    config: ServerConfig,
    catalog: Catalog,
    face_analyzer: GuardedFaceAnalyzer,
    shutdown: CancellationToken,
) -> Result<()> {
    metrics::init_metrics();
    metrics::init_catalog_metrics(&catalog);

    let recommender = Arc::new(Recommender::new(Arc::new(catalog)));

    if let Some(metrics_port) = config.metrics_port {
        let address = config.bind_address.clone();
        let metrics_shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_metrics(address, metrics_port, metrics_shutdown).await {
                error!("Metrics server stopped: {:#}", err);
            }
        });
    }

    let address = config.bind_address.clone();
    let port = config.port;
    let app = make_app(config, recommender, face_analyzer);

    let listener = TcpListener::bind((address.as_str(), port))
        .await
        .with_context(|| format!("Could not bind to {}:{}", address, port))?;
    info!("Ready to serve at {}:{}!", address, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("HTTP server shut down");
    Ok(())
}
