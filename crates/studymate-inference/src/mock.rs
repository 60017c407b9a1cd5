//! Mock generation backend for deterministic testing.
//!
//! Responses are replayed from a script in FIFO order; once the script runs
//! out, the default response is returned. Every request is recorded.
//!
//! ## Usage
//!
//! ```ignore
//! use studymate_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_response(r#"{"summary":"s","keyTakeaways":[]}"#)
//!     .with_failure("quota exceeded");
//! assert_eq!(backend.call_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use studymate_core::{
    Error, GenerationBackend, ModelRequest, ModelResponse, ModelTier, Result, Source,
};

/// One scripted reply.
#[derive(Debug, Clone)]
enum Scripted {
    Reply(ModelResponse),
    Fail(String),
}

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    default_response: Arc<String>,
    latency_ms: u64,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

/// A recorded request and when it ran.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub request: ModelRequest,
    pub started_at: Instant,
    pub finished_at: Instant,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGenerationBackend {
    /// Create a new mock backend with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_response: Arc::new("Mock response".to_string()),
            latency_ms: 0,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Response returned once the script is exhausted.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Arc::new(response.into());
        self
    }

    /// Queue a text reply.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Reply(ModelResponse::text(text)));
        self
    }

    /// Queue a reply carrying grounding citations.
    pub fn with_cited_response(self, text: impl Into<String>, citations: Vec<Source>) -> Self {
        self.push(Scripted::Reply(ModelResponse {
            text: text.into(),
            citations,
        }));
        self
    }

    /// Queue a transport failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail(message.into()));
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Queue a text reply on an already shared backend.
    pub fn push_response(&self, text: impl Into<String>) {
        self.push(Scripted::Reply(ModelResponse::text(text)));
    }

    /// Queue a transport failure on an already shared backend.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(Scripted::Fail(message.into()));
    }

    fn push(&self, entry: Scripted) {
        lock(&self.script).push_back(entry);
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.call_log).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.call_log).len()
    }

    /// Number of calls made with the given tier.
    pub fn tier_call_count(&self, tier: ModelTier) -> usize {
        lock(&self.call_log)
            .iter()
            .filter(|c| c.request.tier == tier)
            .count()
    }

    /// Most recent request, if any.
    pub fn last_request(&self) -> Option<ModelRequest> {
        lock(&self.call_log).last().map(|c| c.request.clone())
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        lock(&self.call_log).clear()
    }

    /// Scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let started_at = Instant::now();
        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }

        lock(&self.call_log).push(MockCall {
            request: request.clone(),
            started_at,
            finished_at: Instant::now(),
        });
        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(Error::Inference(message)),
            None => Ok(ModelResponse::text(self.default_response.as_str())),
        }
    }

    fn model_name(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => "mock-fast",
            ModelTier::Reasoning => "mock-reasoning",
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
