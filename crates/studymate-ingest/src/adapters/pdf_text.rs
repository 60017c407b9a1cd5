//! PDF text extraction through poppler-utils (`pdfinfo`, `pdftotext`).

use std::io::Write;
use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use studymate_core::defaults::{
    EXTRACTION_CMD_TIMEOUT_SECS, LARGE_PDF_PAGE_THRESHOLD, PDF_BATCH_PAGES,
};
use studymate_core::{Error, ExtractionAdapter, ExtractionResult, ExtractionStrategy, Result};

const PDF_MAGIC: &[u8] = b"%PDF";

/// Extracts the text layer of a PDF.
///
/// Documents above the large-PDF threshold are read in fixed page batches.
/// Each external command runs under a timeout.
pub struct PdfTextAdapter {
    timeout: Duration,
}

impl PdfTextAdapter {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(EXTRACTION_CMD_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run an external tool and return its stdout.
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        // A timed-out child is killed when its future is dropped.
        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                Error::Extraction(format!(
                    "{} timed out after {}s",
                    program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| Error::Extraction(format!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            return Err(Error::Extraction(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn page_count(&self, path: &str) -> Option<usize> {
        match self.run("pdfinfo", &[path.to_string()]).await {
            Ok(info) => info_field(&info, "Pages").and_then(|p| p.parse().ok()),
            Err(e) => {
                warn!(error = %e, "pdfinfo failed, extracting without page count");
                None
            }
        }
    }
}

impl Default for PdfTextAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up one `Key: value` line of `pdfinfo` output.
fn info_field<'a>(info: &'a str, key: &str) -> Option<&'a str> {
    info.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        (k.trim() == key).then(|| v.trim()).filter(|v| !v.is_empty())
    })
}

/// Page ranges to extract. One unbounded pass unless the document is large.
fn page_batches(pages: Option<usize>) -> Vec<Option<RangeInclusive<usize>>> {
    match pages {
        Some(n) if n > LARGE_PDF_PAGE_THRESHOLD => (1..=n)
            .step_by(PDF_BATCH_PAGES)
            .map(|first| Some(first..=(first + PDF_BATCH_PAGES - 1).min(n)))
            .collect(),
        _ => vec![None],
    }
}

fn pdftotext_args(path: &str, range: Option<&RangeInclusive<usize>>) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(range) = range {
        args.extend([
            "-f".to_string(),
            range.start().to_string(),
            "-l".to_string(),
            range.end().to_string(),
        ]);
    }
    args.push(path.to_string());
    args.push("-".to_string());
    args
}

fn write_temp(data: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()
        .map_err(|e| Error::Extraction(format!("Failed to create temp file: {}", e)))?;
    file.write_all(data)
        .map_err(|e| Error::Extraction(format!("Failed to write temp file: {}", e)))?;
    Ok(file)
}

#[async_trait]
impl ExtractionAdapter for PdfTextAdapter {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::PdfText
    }

    async fn extract(
        &self,
        data: &[u8],
        filename: &str,
        _mime_type: &str,
    ) -> Result<ExtractionResult> {
        if data.is_empty() {
            return Err(Error::Extraction(format!("'{}' is empty", filename)));
        }
        if !data.starts_with(PDF_MAGIC) {
            return Err(Error::Extraction(format!(
                "'{}' is not a valid PDF (missing %PDF header)",
                filename
            )));
        }

        let file = write_temp(data)?;
        let path = file.path().to_string_lossy().into_owned();

        let pages = self.page_count(&path).await;
        let batches = page_batches(pages);
        if batches.len() > 1 {
            debug!(filename, ?pages, batches = batches.len(), "Extracting large PDF in batches");
        }

        let mut text = String::new();
        for range in &batches {
            let chunk = self
                .run("pdftotext", &pdftotext_args(&path, range.as_ref()))
                .await?;
            text.push_str(&chunk);
        }

        let mut metadata = serde_json::Map::new();
        if let Some(pages) = pages {
            metadata.insert("pages".to_string(), JsonValue::from(pages));
        }
        metadata.insert("batches".to_string(), JsonValue::from(batches.len()));
        metadata.insert("char_count".to_string(), JsonValue::from(text.chars().count()));
        if text.trim().is_empty() {
            // Image-only PDFs have no text layer.
            warn!(filename, "PDF produced no text");
            metadata.insert("empty_text_layer".to_string(), JsonValue::Bool(true));
        }

        Ok(ExtractionResult {
            extracted_text: Some(text),
            metadata: JsonValue::Object(metadata),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match Command::new("pdftotext").arg("-v").output().await {
            // Older poppler builds exit 99 after printing the version.
            Ok(output) => Ok(output.status.success() || output.status.code() == Some(99)),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "pdf_text"
    }
}
