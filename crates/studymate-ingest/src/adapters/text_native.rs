//! Plain-text extraction.

use async_trait::async_trait;

use studymate_core::{ExtractionAdapter, ExtractionResult, ExtractionStrategy, Result};

/// Decodes bytes as UTF-8, replacing invalid sequences.
///
/// A leading byte-order mark is dropped so it never leaks into note text.
pub struct TextNativeAdapter;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[async_trait]
impl ExtractionAdapter for TextNativeAdapter {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::TextNative
    }

    async fn extract(
        &self,
        data: &[u8],
        _filename: &str,
        mime_type: &str,
    ) -> Result<ExtractionResult> {
        let bytes = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let text = String::from_utf8_lossy(bytes).into_owned();
        let lossy = text.contains('\u{FFFD}');

        Ok(ExtractionResult {
            metadata: serde_json::json!({
                "mime_type": mime_type,
                "char_count": text.chars().count(),
                "line_count": text.lines().count(),
                "lossy": lossy,
            }),
            extracted_text: Some(text),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "text_native"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extracts_utf8() {
        let result = TextNativeAdapter
            .extract("Mitochondria\nATP synthase".as_bytes(), "bio.txt", "text/plain")
            .await
            .unwrap();

        assert_eq!(
            result.extracted_text.as_deref(),
            Some("Mitochondria\nATP synthase")
        );
        assert_eq!(result.metadata["line_count"], 2);
        assert_eq!(result.metadata["lossy"], false);
    }

    #[tokio::test]
    async fn test_counts_chars_not_bytes() {
        let result = TextNativeAdapter
            .extract("Δx = v·t".as_bytes(), "phys.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(result.metadata["char_count"], 8);
    }

    #[tokio::test]
    async fn test_strips_bom() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(b"notes");
        let result = TextNativeAdapter
            .extract(&data, "bom.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(result.extracted_text.as_deref(), Some("notes"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_lossy() {
        let data: &[u8] = &[0xFF, 0xFE, b'h', b'i'];
        let result = TextNativeAdapter
            .extract(data, "binary.bin", "application/octet-stream")
            .await
            .unwrap();

        let text = result.extracted_text.unwrap();
        assert!(text.contains("hi"));
        assert!(text.contains('\u{FFFD}'));
        assert_eq!(result.metadata["lossy"], true);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result = TextNativeAdapter
            .extract(b"", "empty.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(result.extracted_text.as_deref(), Some(""));
        assert_eq!(result.metadata["line_count"], 0);
    }

    #[tokio::test]
    async fn test_strategy_and_name() {
        assert_eq!(TextNativeAdapter.strategy(), ExtractionStrategy::TextNative);
        assert_eq!(TextNativeAdapter.name(), "text_native");
        assert!(TextNativeAdapter.health_check().await.unwrap());
    }
}
