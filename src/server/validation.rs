//! Schema checks for JSON request bodies.

use super::error::ApiError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),
    #[error("Request body must be a JSON object")]
    NotAnObject,
    /// Missing, null or blank required field. Carries the client-facing message.
    #[error("{message}")]
    MissingField {
        field: &'static str,
        message: &'static str,
    },
    #[error("Field '{field}' must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// A request body that can be checked field by field from raw JSON.
pub trait RequestSchema: Sized {
    fn from_json(value: &Value) -> Result<Self, ValidationError>;
}

pub fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    value.as_object().ok_or(ValidationError::NotAnObject)
}

/// Reads a required, non-blank string field.
pub fn required_string(
    object: &Map<String, Value>,
    field: &'static str,
    missing_message: &'static str,
) -> Result<String, ValidationError> {
    let missing = ValidationError::MissingField {
        field,
        message: missing_message,
    };
    match object.get(field) {
        None | Some(Value::Null) => Err(missing),
        Some(Value::String(s)) if s.trim().is_empty() => Err(missing),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "string",
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub text: String,
}

impl RequestSchema for TextRequest {
    fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = as_object(value)?;
        Ok(TextRequest {
            text: required_string(object, "text", "Text not provided")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub image: String,
}

impl RequestSchema for ImageRequest {
    fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = as_object(value)?;
        Ok(ImageRequest {
            image: required_string(object, "image", "Image not provided")?,
        })
    }
}

/// JSON body extractor that runs [`RequestSchema`] checks.
///
/// The content type is not enforced, any body that parses as JSON is accepted.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: RequestSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))?;

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|err| ValidationError::MalformedJson(err.to_string()))?;

        Ok(ValidatedJson(T::from_json(&value)?))
    }
}
