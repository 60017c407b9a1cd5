//! # studymate-api
//!
//! HTTP server for studymate. Every request becomes a command for the single
//! state controller; see [`controller`].

pub mod config;
pub mod controller;
pub mod error;
pub mod quiz_session;
pub mod routes;

use std::sync::Arc;

use studymate_core::defaults::COMMAND_QUEUE_CAPACITY;
use studymate_core::{BlobStore, EventBus, GenerationBackend};
use studymate_inference::Tutor;
use studymate_ingest::{ExtractionRegistry, IngestPipeline};

pub use config::ServerConfig;
pub use controller::{Controller, ControllerHandle, ProgressView};
pub use error::ApiError;
pub use quiz_session::{QuizConfig, QuizSession, QuizSnapshot};
pub use routes::router;

/// Wire the tutor clients and ingestion pipeline to `backend` and start the controller.
pub fn spawn_controller(
    backend: Arc<dyn GenerationBackend>,
    blob_store: Option<Arc<dyn BlobStore>>,
    events: EventBus,
) -> ControllerHandle {
    let tutor = Tutor::new(backend);
    let mut pipeline =
        IngestPipeline::new(ExtractionRegistry::with_defaults(), tutor.summarizer.clone());
    if let Some(store) = blob_store {
        pipeline = pipeline.with_blob_store(store);
    }
    Controller::new(tutor, pipeline, events).start(COMMAND_QUEUE_CAPACITY)
}
