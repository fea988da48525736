//! Decoding of base64 image payloads sent by webcam clients.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use thiserror::Error;

/// Standard alphabet, padding optional. Browsers always pad, but hand-made
/// payloads often do not.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageDecodeError {
    #[error("Image payload is empty")]
    Empty,
    #[error("Malformed data URL, missing ',' separator")]
    MalformedDataUrl,
    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl DecodedImage {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Accepts plain base64 or a `data:image/...;base64,` URL.
pub fn decode_image_payload(payload: &str) -> Result<DecodedImage, ImageDecodeError> {
    let payload = payload.trim();
    let encoded = if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map(|(_, body)| body)
            .ok_or(ImageDecodeError::MalformedDataUrl)?
    } else {
        payload
    };

    if encoded.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    let bytes = PAYLOAD_ENGINE
        .decode(encoded)
        .map_err(|err| ImageDecodeError::InvalidBase64(err.to_string()))?;

    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    decoded_image_from_bytes(bytes)
}

/// Validates raw bytes as an image, used for images read from disk.
pub fn decoded_image_from_bytes(bytes: Vec<u8>) -> Result<DecodedImage, ImageDecodeError> {
    match infer::get(&bytes) {
        Some(kind) if kind.mime_type().starts_with("image/") => Ok(DecodedImage {
            mime_type: kind.mime_type().to_string(),
            bytes,
        }),
        Some(kind) => Err(ImageDecodeError::UnsupportedFormat(
            kind.mime_type().to_string(),
        )),
        None => Err(ImageDecodeError::UnsupportedFormat("unknown".to_string())),
    }
}
