//! # studymate-core
//!
//! Core types, traits, and abstractions for the studymate study assistant.
//!
//! This crate provides the domain model, the provider-neutral model request
//! contract with its validation boundary, and the trait definitions that the
//! inference, ingestion and API crates depend on.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod request;
pub mod traits;
pub mod uploads;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, StudyEvent};
pub use models::*;
pub use request::*;
pub use traits::*;
pub use uploads::{detect_content_type, sanitize_filename, UploadedFile};
pub use validation::{decode_payload, extract_json_payload, ResponseOutcome, Validate};
