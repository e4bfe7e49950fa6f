//! Inference backend abstraction
//!
//! Defines the InferenceBackend trait that the categorizer calls to turn a
//! prompt into model text, plus the request/response types shared by
//! implementations. The Ollama HTTP client is the production backend.

pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use ollama::OllamaBackend;

/// Trait for inference backends (Ollama server, test doubles)
///
/// Implementations must be safe to call from several tasks at once.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one generation and return the raw model text
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError>;

    /// Check if the backend is reachable
    async fn is_available(&self) -> bool;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// A single generate call: model, prompt and decoding options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Output format hint; backends that can't constrain output ignore it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ResponseFormat>,
    pub options: GenerateOptions,
    /// Always false: the categorizer needs the whole response at once
    pub stream: bool,
}

impl GenerateRequest {
    /// Deterministic JSON-constrained request for `model`
    pub fn json(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            format: Some(ResponseFormat::Json),
            options: GenerateOptions::deterministic(),
            stream: false,
        }
    }
}

/// Requested response format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
}

/// Sampling options sent with a generate request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
}

impl GenerateOptions {
    /// Temperature 0
    pub fn deterministic() -> Self {
        Self { temperature: 0.0 }
    }
}

/// Raw text produced by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

impl GenerateResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// Errors raised by a backend call. All of them are treated as transient
/// by the categorizer's retry policy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
    #[error("Client setup failed: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_serialization() {
        let request = GenerateRequest::json("gemma3:1b", "hello");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "model": "gemma3:1b",
                "prompt": "hello",
                "format": "json",
                "options": {"temperature": 0.0},
                "stream": false
            })
        );
    }

    #[test]
    fn test_format_omitted_when_unset() {
        let mut request = GenerateRequest::json("m", "p");
        request.format = None;
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("format").is_none());
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let body = r#"{"model":"gemma3:1b","response":"{\"categories\":[]}","done":true}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.response, r#"{"categories":[]}"#);
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Status {
            status: 503,
            body: "loading model".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 503: loading model");

        let err = BackendError::Request("connection refused".to_string());
        assert_eq!(err.to_string(), "Request failed: connection refused");
    }
}
