//! Core traits for studymate abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::NoteType;
use crate::request::{ModelRequest, ModelResponse, ModelTier};
use crate::uploads::PDF_MIME;

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for model text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one request and return the model text plus any grounding citations.
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse>;

    /// Model name serving the given tier.
    fn model_name(&self, tier: ModelTier) -> &str;

    /// Check if the backend is available and responding.
    async fn health_check(&self) -> Result<bool>;
}

// =============================================================================
// EXTRACTION TRAITS
// =============================================================================

/// How text is pulled out of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Direct text decoding (plaintext, markdown).
    #[default]
    TextNative,
    /// PDF text extraction using pdftotext.
    PdfText,
}

impl ExtractionStrategy {
    /// Determine extraction strategy from a detected MIME type.
    pub fn from_mime_type(mime: &str) -> Self {
        if mime.eq_ignore_ascii_case(PDF_MIME) {
            Self::PdfText
        } else {
            Self::TextNative
        }
    }

    /// Note type produced by this strategy.
    pub fn note_type(&self) -> NoteType {
        match self {
            Self::TextNative => NoteType::Text,
            Self::PdfText => NoteType::Pdf,
        }
    }
}

/// Result of content extraction from an uploaded file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted text content, if any.
    pub extracted_text: Option<String>,
    /// Metadata about the extraction (format-specific).
    pub metadata: JsonValue,
}

/// Adapter for extracting text from uploaded files.
///
/// Each adapter handles one extraction strategy. Adapters are registered in
/// an `ExtractionRegistry` and dispatched on the file's detected strategy.
#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    /// The extraction strategy this adapter handles.
    fn strategy(&self) -> ExtractionStrategy;

    /// Extract content from raw file data.
    async fn extract(&self, data: &[u8], filename: &str, mime_type: &str)
        -> Result<ExtractionResult>;

    /// Check if the adapter's external dependencies are available.
    async fn health_check(&self) -> Result<bool>;

    /// Human-readable name of this adapter.
    fn name(&self) -> &str;
}

// =============================================================================
// STORAGE TRAITS
// =============================================================================

/// Destination for raw uploaded bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path` and return a locator for the stored object.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;
}
