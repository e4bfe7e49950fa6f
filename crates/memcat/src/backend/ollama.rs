//! Ollama inference backend
//!
//! Implements InferenceBackend against an Ollama server's `/api/generate`
//! endpoint. Retrying is left to the caller; one `generate` is one HTTP call.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::backend::{BackendError, GenerateRequest, GenerateResponse, InferenceBackend};
use crate::config::BackendConfig;
use crate::error;

/// Ollama HTTP client
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    base_url: String,
}

impl OllamaBackend {
    /// Create a client for the configured host.
    ///
    /// Fails if the host is not an http(s) URL or the HTTP client can't be built.
    pub fn new(config: &BackendConfig) -> error::Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        info!(
            "OllamaBackend initialized with host: {}, timeout: {}s",
            config.host, config.timeout_secs
        );

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        let url = self.endpoint("api/generate");
        debug!("Calling Ollama at: {} (model: {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| BackendError::InvalidBody(e.to_string()))
    }

    async fn is_available(&self) -> bool {
        match self.client.get(self.endpoint("api/tags")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Ollama health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(host: String) -> BackendConfig {
        BackendConfig {
            host,
            model: "gemma3:1b".to_string(),
            timeout_secs: 30,
        }
    }

    #[tokio::test]
    async fn test_generate_sends_json_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemma3:1b",
                "format": "json",
                "stream": false,
                "options": {"temperature": 0.0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gemma3:1b",
                "response": "{\"categories\": [\"work\"]}",
                "done": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = OllamaBackend::new(&create_test_config(mock_server.uri())).unwrap();
        let request = GenerateRequest::json("gemma3:1b", "Categorize this");

        let result = backend.generate(&request).await.unwrap();
        assert_eq!(result.response, "{\"categories\": [\"work\"]}");
    }

    #[tokio::test]
    async fn test_trailing_slash_in_host() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": "ok"})),
            )
            .mount(&mock_server)
            .await;

        let host = format!("{}/", mock_server.uri());
        let backend = OllamaBackend::new(&create_test_config(host)).unwrap();
        assert!(!backend.base_url().ends_with('/'));

        let result = backend.generate(&GenerateRequest::json("m", "p")).await;
        assert_eq!(result.unwrap().response, "ok");
    }

    #[tokio::test]
    async fn test_generate_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let backend = OllamaBackend::new(&create_test_config(mock_server.uri())).unwrap();

        let err = backend
            .generate(&GenerateRequest::json("m", "p"))
            .await
            .unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_generate_invalid_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&mock_server)
            .await;

        let backend = OllamaBackend::new(&create_test_config(mock_server.uri())).unwrap();

        let err = backend
            .generate(&GenerateRequest::json("m", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_generate_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(mock_server.uri());
        config.timeout_secs = 1;
        let backend = OllamaBackend::new(&config).unwrap();

        let err = backend
            .generate(&GenerateRequest::json("m", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on port 9 locally
        let backend =
            OllamaBackend::new(&create_test_config("http://127.0.0.1:9".to_string())).unwrap();

        let err = backend
            .generate(&GenerateRequest::json("m", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
        assert!(!backend.is_available().await);
    }

    #[tokio::test]
    async fn test_is_available() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .mount(&mock_server)
            .await;

        let backend = OllamaBackend::new(&create_test_config(mock_server.uri())).unwrap();
        assert!(backend.is_available().await);
    }

    #[tokio::test]
    async fn test_is_available_false_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let backend = OllamaBackend::new(&create_test_config(mock_server.uri())).unwrap();
        assert!(!backend.is_available().await);
    }

    #[test]
    fn test_new_rejects_invalid_host() {
        let result = OllamaBackend::new(&create_test_config("ollama:11434:bad".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_name() {
        let backend =
            OllamaBackend::new(&create_test_config("http://localhost:11434".to_string())).unwrap();
        assert_eq!(backend.name(), "ollama");
    }
}
