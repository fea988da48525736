//! Facial emotion detection.
//!
//! The actual face model runs outside this process. [`RemoteFaceAnalyzer`]
//! talks to it over HTTP; [`detect_face_emotion`] applies the fallback policy
//! so that image or model failures never fail the caller.

use super::image::{decode_image_payload, decoded_image_from_bytes, DecodedImage};
use super::EmotionLabel;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum FaceAnalysisError {
    #[error("Facial analysis is not available")]
    Unavailable,
    #[error("Failed to reach facial analysis service: {0}")]
    Transport(String),
    #[error("Facial analysis service answered with status {0}")]
    BadStatus(u16),
    #[error("Invalid facial analysis response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    /// Returns the dominant emotion found in the image, lowercased.
    async fn analyze(&self, image: &DecodedImage) -> Result<String, FaceAnalysisError>;
}

/// Used when no facial analysis service is configured.
pub struct UnavailableFaceAnalyzer;

#[async_trait]
impl FaceAnalyzer for UnavailableFaceAnalyzer {
    async fn analyze(&self, _image: &DecodedImage) -> Result<String, FaceAnalysisError> {
        Err(FaceAnalysisError::Unavailable)
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    image: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    dominant_emotion: String,
}

/// HTTP client for an external facial emotion model.
///
/// Sends `POST {base_url}/analyze` with `{"image": <base64>, "mime_type": ...}`
/// and expects `{"dominant_emotion": "..."}` back.
pub struct RemoteFaceAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteFaceAnalyzer {
    pub fn new(base_url: String, timeout_sec: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create facial analysis HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }
}

/// Remote analyzer when `url` is set, otherwise one that always fails over
/// to the neutral fallback.
pub fn make_face_analyzer(
    url: Option<&str>,
    timeout_sec: u64,
) -> anyhow::Result<Arc<dyn FaceAnalyzer>> {
    match url {
        Some(url) => {
            info!("Using facial analysis service at {}", url);
            Ok(Arc::new(RemoteFaceAnalyzer::new(url.to_string(), timeout_sec)?))
        }
        None => {
            info!("No facial analysis service configured, webcam requests will default to neutral");
            Ok(Arc::new(UnavailableFaceAnalyzer))
        }
    }
}

#[async_trait]
impl FaceAnalyzer for RemoteFaceAnalyzer {
    async fn analyze(&self, image: &DecodedImage) -> Result<String, FaceAnalysisError> {
        let url = format!("{}/analyze", self.base_url);
        let body = AnalyzeRequest {
            image: image.to_base64(),
            mime_type: &image.mime_type,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| FaceAnalysisError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(FaceAnalysisError::BadStatus(response.status().as_u16()));
        }

        let parsed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|err| FaceAnalysisError::InvalidResponse(err.to_string()))?;

        let emotion = parsed.dominant_emotion.trim().to_lowercase();
        if emotion.is_empty() {
            return Err(FaceAnalysisError::InvalidResponse(
                "empty dominant_emotion".to_string(),
            ));
        }
        Ok(emotion)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceDetection {
    pub emotion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl FaceDetection {
    fn fallback(warning: String) -> FaceDetection {
        FaceDetection {
            emotion: EmotionLabel::Neutral.to_string(),
            warning: Some(warning),
        }
    }
}

/// Decodes `payload` and runs it through `analyzer`. Any failure degrades to
/// `neutral` with a warning.
pub async fn detect_face_emotion(analyzer: &dyn FaceAnalyzer, payload: &str) -> FaceDetection {
    let image = match decode_image_payload(payload) {
        Ok(image) => image,
        Err(err) => {
            warn!("Could not decode webcam image, defaulting to neutral: {}", err);
            return FaceDetection::fallback(format!("Image could not be decoded: {}", err));
        }
    };
    detect_decoded_face_emotion(analyzer, &image).await
}

/// Same fallback policy as [`detect_face_emotion`] for raw image bytes, such
/// as a file read from disk.
pub async fn detect_bytes_face_emotion(
    analyzer: &dyn FaceAnalyzer,
    bytes: Vec<u8>,
) -> FaceDetection {
    match decoded_image_from_bytes(bytes) {
        Ok(image) => detect_decoded_face_emotion(analyzer, &image).await,
        Err(err) => {
            warn!("Could not read image, defaulting to neutral: {}", err);
            FaceDetection::fallback(format!("Image could not be decoded: {}", err))
        }
    }
}

pub async fn detect_decoded_face_emotion(
    analyzer: &dyn FaceAnalyzer,
    image: &DecodedImage,
) -> FaceDetection {
    debug!(
        "Analyzing {} image of {} bytes",
        image.mime_type,
        image.bytes.len()
    );
    match analyzer.analyze(image).await {
        Ok(emotion) => FaceDetection {
            emotion,
            warning: None,
        },
        Err(err) => {
            warn!("Facial analysis failed, defaulting to neutral: {}", err);
            FaceDetection::fallback(format!("Facial analysis failed: {}", err))
        }
    }
}
