//! # studymate-ingest
//!
//! Note ingestion for studymate.
//!
//! This crate provides:
//! - Text and PDF extraction adapters behind a strategy registry
//! - A sequential batch pipeline that turns uploads into summarized notes
//! - A local blob store for raw uploads
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use studymate_ingest::{ExtractionRegistry, IngestPipeline, LocalBlobStore};
//! use studymate_inference::{GeminiBackend, Summarizer};
//!
//! let backend = Arc::new(GeminiBackend::from_env()?);
//! let pipeline = IngestPipeline::new(ExtractionRegistry::with_defaults(), Summarizer::new(backend))
//!     .with_blob_store(Arc::new(LocalBlobStore::new("./uploads")));
//!
//! let report = pipeline.ingest_batch(files).await;
//! println!("{} notes, {} failed", report.notes.len(), report.failures.len());
//! ```

pub mod adapters;
pub mod blob;
pub mod extraction;
pub mod pipeline;

pub use adapters::{PdfTextAdapter, TextNativeAdapter};
pub use blob::{blob_path, LocalBlobStore};
pub use extraction::ExtractionRegistry;
pub use pipeline::{IngestFailure, IngestPipeline, IngestReport};
