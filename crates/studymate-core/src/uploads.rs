//! Uploaded file handling: content-type detection and file name sanitizing.
//!
//! Uploads are routed to exactly one of two extraction paths. PDFs (detected
//! by magic bytes, or by a trustworthy claim) go through PDF text
//! extraction; everything else is read as text.

use serde::{Deserialize, Serialize};

use crate::defaults::UNTITLED_NOTE;
use crate::models::NoteType;

/// MIME type routed through PDF text extraction.
pub const PDF_MIME: &str = "application/pdf";

/// A raw file as received from the upload surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original file name as supplied by the client.
    pub name: String,
    /// Content type claimed by the client (may be empty).
    pub content_type: String,
    /// Raw file bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Content type after magic-byte detection.
    pub fn detected_content_type(&self) -> String {
        detect_content_type(&self.name, &self.data, &self.content_type)
    }

    /// Note type this upload will produce.
    pub fn note_type(&self) -> NoteType {
        note_type_for(&self.detected_content_type())
    }

    /// Sanitized display name for the resulting note.
    pub fn display_name(&self) -> String {
        sanitize_filename(&self.name)
    }
}

/// Detect actual content type from file magic bytes.
///
/// Returns the detected MIME type if magic bytes match a known format,
/// falling back to extension-based detection, then to the claimed type.
pub fn detect_content_type(filename: &str, data: &[u8], claimed: &str) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some(ext) = filename.rsplit_once('.').map(|(_, ext)| ext) {
        if let Some(mime) = mime_from_extension(ext) {
            return mime.to_string();
        }
    }

    // A PDF claim without the %PDF header is not trusted.
    if claimed == PDF_MIME {
        return "application/octet-stream".to_string();
    }

    if claimed.is_empty() {
        return "text/plain".to_string();
    }

    claimed.to_string()
}

/// Map a detected MIME type to the note type it produces.
pub fn note_type_for(mime: &str) -> NoteType {
    if mime == PDF_MIME {
        NoteType::Pdf
    } else {
        NoteType::Text
    }
}

/// Text-only extensions (formats with no magic bytes).
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "txt" | "log" | "text" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "tex" | "latex" => Some("application/x-tex"),
        "html" | "htm" => Some("text/html"),
        "json" => Some("application/json"),
        "rst" => Some("text/x-rst"),
        _ => None,
    }
}

/// Strip path components and unsafe characters from an uploaded file name.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return UNTITLED_NOTE.to_string();
    }

    if sanitized.chars().count() > 255 {
        return sanitized.chars().take(255).collect();
    }

    sanitized.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf_magic_bytes() {
        let data = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3";
        assert_eq!(detect_content_type("notes.pdf", data, ""), PDF_MIME);
    }

    #[test]
    fn test_detect_pdf_despite_wrong_claim() {
        let data = b"%PDF-1.4 rest of file";
        assert_eq!(
            detect_content_type("upload.bin", data, "text/plain"),
            PDF_MIME
        );
    }

    #[test]
    fn test_detect_downgrades_fake_pdf() {
        let mime = detect_content_type("fake.bin", b"just some text", PDF_MIME);
        assert_eq!(mime, "application/octet-stream");
        assert_eq!(note_type_for(&mime), NoteType::Text);
    }

    #[test]
    fn test_detect_falls_back_to_extension_for_text() {
        assert_eq!(
            detect_content_type("chapter.md", b"# Photosynthesis", ""),
            "text/markdown"
        );
    }

    #[test]
    fn test_detect_empty_claim_is_text() {
        assert_eq!(detect_content_type("README", b"hello", ""), "text/plain");
    }

    #[test]
    fn test_uploaded_file_note_type() {
        let pdf = UploadedFile::new("a.pdf", PDF_MIME, b"%PDF-1.5".to_vec());
        let txt = UploadedFile::new("a.txt", "text/plain", b"cells".to_vec());
        assert_eq!(pdf.note_type(), NoteType::Pdf);
        assert_eq!(txt.note_type(), NoteType::Text);
    }

    #[test]
    fn test_sanitize_removes_path() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\bio.txt"), "bio.txt");
    }

    #[test]
    fn test_sanitize_removes_dangerous_chars() {
        assert_eq!(sanitize_filename("what?<is>.txt"), "what__is_.txt");
    }

    #[test]
    fn test_sanitize_handles_empty() {
        assert_eq!(sanitize_filename(""), UNTITLED_NOTE);
        assert_eq!(sanitize_filename("   "), UNTITLED_NOTE);
        assert_eq!(sanitize_filename("dir/"), UNTITLED_NOTE);
    }

    #[test]
    fn test_sanitize_truncates_long_names() {
        let long = "a".repeat(400);
        assert_eq!(sanitize_filename(&long).chars().count(), 255);
    }
}
