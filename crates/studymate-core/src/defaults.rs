//! Centralized default constants for studymate.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini REST endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for short, latency-sensitive calls (summaries, chat).
pub const FAST_MODEL: &str = "gemini-3-flash-preview";

/// Model used for reasoning-heavy calls (quizzes, progress audits, drills).
pub const REASONING_MODEL: &str = "gemini-3-pro-preview";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 300;

/// Generation calls slower than this are logged with `slow = true`.
pub const SLOW_GENERATION_MS: u64 = 30_000;

/// Sampling temperature for tutor chat answers.
pub const CHAT_TEMPERATURE: f32 = 0.3;

// =============================================================================
// TUTOR RESPONSES
// =============================================================================

/// Summary text used when the model's summary cannot be decoded.
pub const SUMMARY_FALLBACK: &str = "Failed to generate summary.";

/// Assistant message appended when a chat request fails.
pub const CHAT_APOLOGY: &str =
    "I'm sorry, I ran into a problem while answering that. Please try again.";

/// Assistant text used when the model returns an empty answer.
pub const EMPTY_CHAT_REPLY: &str = "I couldn't generate a response.";

/// Citation title used when the provider omits one.
pub const CITATION_TITLE_FALLBACK: &str = "External Resource";

/// Chat context used when no notes have been uploaded.
pub const EMPTY_CORPUS_CONTEXT: &str = "No documents uploaded yet.";

/// Study-time estimate reported by the zero-valued progress analysis.
pub const STUDY_TIME_FALLBACK: &str = "0h";

// =============================================================================
// QUIZ & PROGRESS
// =============================================================================

/// Number of options every quiz question must carry.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Completed quizzes required before progress is shown.
pub const PROGRESS_MIN_QUIZZES: usize = 1;

// =============================================================================
// INGESTION
// =============================================================================

/// Timeout for each external extraction command (pdftotext, pdfinfo).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 120;

/// PDFs with more pages than this are extracted in batches.
pub const LARGE_PDF_PAGE_THRESHOLD: usize = 100;

/// Page batch size for large PDF extraction.
pub const PDF_BATCH_PAGES: usize = 50;

/// Name given to uploads whose file name sanitizes to nothing.
pub const UNTITLED_NOTE: &str = "untitled";

/// Default directory for the local blob store.
pub const UPLOAD_DIR: &str = "./uploads";

/// Blob store namespace prefix for raw uploads.
pub const BLOB_PREFIX: &str = "files";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "127.0.0.1";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum request body size in bytes (50 MB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Capacity of the controller command queue.
pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Default event bus broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Interval between SSE keep-alive comments on the event stream.
pub const SSE_KEEPALIVE_SECS: u64 = 15;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Origins allowed by CORS when `CORS_ALLOWED_ORIGINS` is unset.
pub const CORS_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
