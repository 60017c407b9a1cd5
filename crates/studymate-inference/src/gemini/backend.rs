//! Gemini generation backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, field::Empty, info, instrument, warn, Span};

use studymate_core::defaults::{
    CITATION_TITLE_FALLBACK, FAST_MODEL, GEMINI_URL, GEN_TIMEOUT_SECS, REASONING_MODEL,
    SLOW_GENERATION_MS,
};
use studymate_core::{
    logging, Error, GenerationBackend, ModelRequest, ModelResponse, ModelTier, Result, Source,
};

use super::error::{to_studymate_error, GeminiErrorCode};
use super::types::*;

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL for the REST endpoint (without the `/models` suffix).
    pub base_url: String,
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,
    /// Model for [`ModelTier::Fast`] requests.
    pub fast_model: String,
    /// Model for [`ModelTier::Reasoning`] requests.
    pub reasoning_model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl GeminiConfig {
    /// Config with default endpoint and models for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_URL.to_string(),
            api_key: api_key.into(),
            fast_model: FAST_MODEL.to_string(),
            reasoning_model: REASONING_MODEL.to_string(),
            timeout_seconds: GEN_TIMEOUT_SECS,
        }
    }

    /// Load from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GEMINI_API_KEY` | (required) |
    /// | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GEMINI_FAST_MODEL` | `gemini-3-flash-preview` |
    /// | `GEMINI_REASONING_MODEL` | `gemini-3-pro-preview` |
    /// | `GEMINI_TIMEOUT` | `300` |
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        Ok(Self {
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| GEMINI_URL.to_string()),
            api_key,
            fast_model: std::env::var("GEMINI_FAST_MODEL")
                .unwrap_or_else(|_| FAST_MODEL.to_string()),
            reasoning_model: std::env::var("GEMINI_REASONING_MODEL")
                .unwrap_or_else(|_| REASONING_MODEL.to_string()),
            timeout_seconds: std::env::var("GEMINI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(GEN_TIMEOUT_SECS),
        })
    }
}

/// Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Gemini backend: url={}, fast={}, reasoning={}",
            config.base_url, config.fast_model, config.reasoning_model
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Map a non-success response body onto an error.
    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (error_status, message) = match serde_json::from_str::<GeminiErrorResponse>(&body) {
            Ok(parsed) => (parsed.error.status, parsed.error.message),
            Err(_) => (String::new(), body),
        };
        let code = GeminiErrorCode::from_response(status.as_u16(), &error_status);
        warn!(
            status = status.as_u16(),
            ?code,
            retryable = code.is_retryable(),
            "Gemini request failed"
        );
        to_studymate_error(code, &format!("Gemini returned {}: {}", status, message))
    }
}

/// Convert grounding chunks into citations.
///
/// Chunks without a URI are dropped; a missing title gets a placeholder.
pub fn citations_from_grounding(chunks: &[GroundingChunk]) -> Vec<Source> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
            let title = web
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(CITATION_TITLE_FALLBACK);
            Some(Source {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(
        skip(self, request),
        fields(
            subsystem = "inference",
            component = "gemini",
            op = "generate",
            model = %self.model_name(request.tier),
            prompt_len = request.prompt_len(),
            response_len = Empty,
            result_count = Empty,
            duration_ms = Empty,
        )
    )]
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let start = Instant::now();
        let model = self.model_name(request.tier);

        debug!(
            json = request.expects_json(),
            search = request.search,
            turns = request.contents.len(),
            "Starting generation"
        );

        let body = GenerateContentRequest::from(request);
        let response = self
            .client
            .post(self.url(&format!("/models/{}:generateContent", model)))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let text = result.text();
        let citations = citations_from_grounding(result.grounding_chunks());
        let elapsed = start.elapsed().as_millis() as u64;

        let span = Span::current();
        span.record(logging::RESPONSE_LEN, text.len());
        span.record(logging::RESULT_COUNT, citations.len());
        span.record(logging::DURATION_MS, elapsed);
        debug!("Generation complete");

        if elapsed > SLOW_GENERATION_MS {
            warn!(
                duration_ms = elapsed,
                prompt_len = request.prompt_len(),
                slow = true,
                "Slow generation operation"
            );
        }

        Ok(ModelResponse { text, citations })
    }

    fn model_name(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Reasoning => &self.config.reasoning_model,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/models"))
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Gemini health check passed");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Gemini health check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Gemini health check error: {}", e);
                Ok(false)
            }
        }
    }
}
