//! Categorizer module for tagging memories with topic labels
//!
//! The categorizer sends a memory to an inference backend, parses whatever
//! text comes back into category labels, and falls back to a fixed default
//! list when the backend can't be reached at all.

pub mod parse;
pub mod prompts;
pub mod retry;
pub mod types;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::backend::{GenerateRequest, InferenceBackend, OllamaBackend};
use crate::config::Config;

pub use parse::parse_categories;
pub use prompts::{MEMORY_CATEGORIZATION_PROMPT, build_prompt};
pub use retry::{RetryError, RetryPolicy};
pub use types::{
    CategorizeError, DEFAULT_CATEGORIES, ParseSource, ParsedCategories, default_categories,
};

/// Turns memory text into category labels using an inference backend.
///
/// Holds no per-call state; share it behind an `Arc` to categorize
/// concurrently.
pub struct Categorizer {
    backend: Arc<dyn InferenceBackend>,
    model: String,
    retry: RetryPolicy,
    prompt_template: String,
}

impl Categorizer {
    /// Create a categorizer over any backend
    pub fn new(backend: Arc<dyn InferenceBackend>, model: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            backend,
            model: model.into(),
            retry,
            prompt_template: MEMORY_CATEGORIZATION_PROMPT.to_string(),
        }
    }

    /// Create a categorizer backed by Ollama as described by `config`
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let backend = OllamaBackend::new(&config.backend)?;
        let categorizer = Self::new(
            Arc::new(backend),
            config.backend.model.clone(),
            RetryPolicy::from_config(&config.retry),
        );

        info!(
            "Categorizer initialized with model: {}, max attempts: {}",
            categorizer.model,
            categorizer.retry.max_attempts()
        );

        Ok(categorizer)
    }

    /// Replace the prompt template (see [`build_prompt`] for interpolation)
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Name of the backend in use, as reported in logs
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Categorize a memory. Never fails.
    ///
    /// Any error or panic in the pipeline is logged and replaced by
    /// [`DEFAULT_CATEGORIES`]. A well-formed but empty answer stays empty.
    pub async fn categorize(&self, text: &str) -> Vec<String> {
        match AssertUnwindSafe(self.try_categorize(text)).catch_unwind().await {
            Ok(Ok(categories)) => categories,
            Ok(Err(e)) => {
                error!("Failed to get categories: {}", e);
                default_categories()
            }
            Err(panic) => {
                let e = CategorizeError::Unexpected(panic_message(panic.as_ref()));
                error!("Failed to get categories: {}", e);
                default_categories()
            }
        }
    }

    /// Categorize a memory, reporting failure instead of substituting defaults
    pub async fn try_categorize(&self, text: &str) -> Result<Vec<String>, CategorizeError> {
        let request = self.build_request(text);
        let backend = self.backend.as_ref();
        let request_ref = &request;

        let response = self
            .retry
            .run(move |attempt| {
                debug!(
                    "Categorization attempt {} via {} (model: {})",
                    attempt,
                    backend.name(),
                    request_ref.model
                );
                backend.generate(request_ref)
            })
            .await
            .map_err(|e| CategorizeError::RetriesExhausted {
                attempts: e.attempts,
                source: e.last,
            })?;

        debug!("Categorization response: {}", response.response);

        let parsed = parse_categories(&response.response);
        debug!(
            "Parsed {} categories via {} path",
            parsed.categories.len(),
            parsed.source.as_str()
        );

        Ok(parsed.categories)
    }

    /// Check if the backend is reachable
    pub async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    fn build_request(&self, text: &str) -> GenerateRequest {
        GenerateRequest::json(self.model.clone(), build_prompt(&self.prompt_template, text))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during categorization".to_string()
    }
}
