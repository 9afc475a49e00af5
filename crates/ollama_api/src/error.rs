use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum OllamaApiError {
    InvalidBaseUrl(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    MalformedChunk(String),
    Serde(JsonError),
    StreamFailed { message: String },
    Cancelled,
    Unknown(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub error: Option<String>,
}

impl fmt::Display for OllamaApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::MalformedChunk(line) => write!(f, "malformed stream record: {line}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::StreamFailed { message } => write!(f, "stream failed: {message}"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for OllamaApiError {}

impl From<reqwest::Error> for OllamaApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for OllamaApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Extract the host's error message from a non-success response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.error.filter(|value| !value.trim().is_empty()) {
            return message;
        }
    }

    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
