//! Gemini generation backend.
//!
//! Talks to the `generateContent` REST endpoint. Structured calls request
//! `application/json` output constrained by a response schema; chat calls
//! enable Google Search grounding and surface its citations.
//!
//! # Example
//!
//! ```rust,no_run
//! use studymate_inference::gemini::{GeminiBackend, GeminiConfig};
//! use studymate_core::{GenerationBackend, ModelRequest, ModelTier};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::new(GeminiConfig::new("my-key")).unwrap();
//!     let request = ModelRequest::prompt(ModelTier::Fast, "Explain osmosis.");
//!     let response = backend.generate(&request).await.unwrap();
//!     println!("{}", response.text);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{citations_from_grounding, GeminiBackend, GeminiConfig};
pub use error::{to_studymate_error, GeminiErrorCode};
pub use types::*;
