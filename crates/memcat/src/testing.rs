//! Test utilities for memcat - scripted backends
//!
//! `MockBackend` replays a script of replies and records every request it
//! receives, so tests can check prompts, attempt counts and retry timing
//! without a running Ollama server.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::backend::{BackendError, GenerateRequest, GenerateResponse, InferenceBackend};

/// One scripted backend outcome
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text as the model response
    Text(String),
    /// Fail the call with this error
    Fail(BackendError),
    /// Panic inside the call
    Panic(String),
}

/// Scripted inference backend.
///
/// Scripted replies are used in order; once the script runs out every call
/// gets the fallback reply.
#[derive(Debug)]
pub struct MockBackend {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    available: bool,
    calls: Mutex<Vec<(Instant, GenerateRequest)>>,
}

impl MockBackend {
    fn with_fallback(fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            available: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend that always answers with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_fallback(MockReply::Text(text.into()))
    }

    /// Backend whose every call fails with a request error
    pub fn failing() -> Self {
        Self::with_fallback(MockReply::Fail(BackendError::Request(
            "connection refused".to_string(),
        )))
    }

    /// Backend whose every call panics
    pub fn panicking(message: impl Into<String>) -> Self {
        Self::with_fallback(MockReply::Panic(message.into()))
    }

    /// Queue a reply ahead of the fallback
    pub fn then(self, reply: MockReply) -> Self {
        lock(&self.script).push_back(reply);
        self
    }

    /// Queue a failing call ahead of the fallback
    pub fn then_fail(self, error: BackendError) -> Self {
        self.then(MockReply::Fail(error))
    }

    /// Queue a text reply ahead of the fallback
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.then(MockReply::Text(text.into()))
    }

    /// Set what `is_available` reports
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Number of generate calls received
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Requests received, in order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock(&self.calls).iter().map(|(_, r)| r.clone()).collect()
    }

    /// Instants at which each call arrived
    pub fn call_times(&self) -> Vec<Instant> {
        lock(&self.calls).iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        lock(&self.calls).push((Instant::now(), request.clone()));

        let reply = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            MockReply::Text(text) => Ok(GenerateResponse::new(text)),
            MockReply::Fail(error) => Err(error),
            MockReply::Panic(message) => panic!("{message}"),
        }
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
