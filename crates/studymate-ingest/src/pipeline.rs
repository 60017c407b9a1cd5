//! Sequential batch ingestion: store, extract, build note, summarize.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn, Span};

use studymate_core::{
    logging, BlobStore, Error, ExtractionStrategy, Note, Result, UploadedFile,
};
use studymate_inference::Summarizer;

use crate::blob::blob_path;
use crate::extraction::ExtractionRegistry;

/// A file that did not produce a note.
#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of one batch, in input order.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub notes: Vec<Note>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.failures.is_empty()
    }
}

/// Turns uploaded files into summarized notes.
pub struct IngestPipeline {
    registry: ExtractionRegistry,
    summarizer: Summarizer,
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl IngestPipeline {
    pub fn new(registry: ExtractionRegistry, summarizer: Summarizer) -> Self {
        Self {
            registry,
            summarizer,
            blob_store: None,
        }
    }

    /// Also keep a copy of every raw upload.
    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Process a batch one file at a time.
    ///
    /// A file that fails extraction or summarization is logged and reported
    /// in `failures`; the rest of the batch still runs.
    #[instrument(
        skip(self, files),
        fields(
            subsystem = "ingest",
            component = "pipeline",
            op = "ingest_batch",
            files = files.len(),
            result_count = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    )]
    pub async fn ingest_batch(&self, files: Vec<UploadedFile>) -> IngestReport {
        let start = Instant::now();
        let mut report = IngestReport::default();

        for file in files {
            match self.ingest_one(&file).await {
                Ok(note) => report.notes.push(note),
                Err(e) => {
                    error!(file_name = %file.name, error = %e, "Dropping file from batch");
                    report.failures.push(IngestFailure {
                        name: file.display_name(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let span = Span::current();
        span.record(logging::RESULT_COUNT, report.notes.len());
        span.record(logging::DURATION_MS, start.elapsed().as_millis() as u64);
        info!(
            notes = report.notes.len(),
            failed = report.failures.len(),
            "Ingestion batch finished"
        );
        report
    }

    /// Ingest a single file. No note is returned unless every step succeeded.
    pub async fn ingest_one(&self, file: &UploadedFile) -> Result<Note> {
        let name = file.display_name();
        self.store_raw(&name, &file.data).await;

        let mime_type = file.detected_content_type();
        let strategy = ExtractionStrategy::from_mime_type(&mime_type);
        debug!(file_name = %name, %mime_type, ?strategy, "Extracting upload");

        let extracted = self
            .registry
            .extract(strategy, &file.data, &name, &mime_type)
            .await?;
        let text = extracted
            .extracted_text
            .ok_or_else(|| Error::Extraction(format!("No text extracted from '{}'", name)))?;

        let mut note = Note::new(name, text, strategy.note_type());
        let summary = self.summarizer.summarize(&note).await?;
        note.attach_summary(summary);

        info!(note_id = %note.id(), name = note.name(), "Note added");
        Ok(note)
    }

    async fn store_raw(&self, name: &str, data: &[u8]) {
        let Some(store) = &self.blob_store else {
            return;
        };
        let path = blob_path(name);
        if let Err(e) = store.upload(&path, data).await {
            warn!(%path, error = %e, "Failed to store raw upload");
        }
    }
}
