//! Note summarization.

use std::sync::Arc;

use tracing::{instrument, warn};

use studymate_core::{
    Error, GenerationBackend, ModelRequest, ModelTier, Note, ResponseOutcome, ResponseSchema,
    Result, SummaryResponse,
};

/// Produces `{summary, keyTakeaways}` for a single note.
#[derive(Clone)]
pub struct Summarizer {
    backend: Arc<dyn GenerationBackend>,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn schema() -> ResponseSchema {
        ResponseSchema::object([
            (
                "summary",
                ResponseSchema::string()
                    .describe("Two or three sentence overview. Math in LaTeX."),
            ),
            (
                "keyTakeaways",
                ResponseSchema::array(ResponseSchema::string())
                    .describe("Short bullet points. Math in LaTeX."),
            ),
        ])
    }

    pub fn build_request(note: &Note) -> ModelRequest {
        let prompt = format!(
            "Summarize the study material below for a student.\n\
             Write any equations or chemical formulas in LaTeX ($...$ inline, $$...$$ for display).\n\n\
             Material:\n{}",
            note.content()
        );
        ModelRequest::prompt(ModelTier::Fast, prompt).with_schema(Self::schema())
    }

    /// Summarize one note.
    ///
    /// Output that does not match the schema yields
    /// [`SummaryResponse::fallback`]; a failed call is returned as an error.
    #[instrument(
        skip(self, note),
        fields(subsystem = "inference", component = "summarizer", op = "summarize", note_id = %note.id())
    )]
    pub async fn summarize(&self, note: &Note) -> Result<SummaryResponse> {
        let request = Self::build_request(note);
        let result = self.backend.generate(&request).await.map(|r| r.text);

        match ResponseOutcome::<SummaryResponse>::from_response(result) {
            ResponseOutcome::Ok(summary) => Ok(summary),
            ResponseOutcome::SchemaError(e) => {
                warn!(error = %e, "Summary did not match schema, using fallback");
                Ok(SummaryResponse::fallback())
            }
            ResponseOutcome::TransportError(e) => Err(Error::Inference(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use studymate_core::NoteType;

    fn note() -> Note {
        Note::new("bio.txt", "Photosynthesis converts light to energy.", NoteType::Text)
    }

    #[tokio::test]
    async fn test_summarize_ok() {
        let mock = MockGenerationBackend::new().with_response(
            r#"{"summary":"Plants make sugar.","keyTakeaways":["light","chlorophyll"]}"#,
        );
        let summarizer = Summarizer::new(Arc::new(mock.clone()));

        let summary = summarizer.summarize(&note()).await.unwrap();
        assert_eq!(summary.summary, "Plants make sugar.");
        assert_eq!(summary.key_takeaways.len(), 2);

        let request = mock.last_request().unwrap();
        assert_eq!(request.tier, ModelTier::Fast);
        assert!(request.expects_json());
        assert!(request.contents[0].text.contains("Photosynthesis"));
    }

    #[tokio::test]
    async fn test_summarize_unparseable_uses_fallback() {
        let mock = MockGenerationBackend::new().with_response("Sure! Here's a summary...");
        let summarizer = Summarizer::new(Arc::new(mock));

        let summary = summarizer.summarize(&note()).await.unwrap();
        assert_eq!(summary, SummaryResponse::fallback());
    }

    #[tokio::test]
    async fn test_summarize_transport_failure_is_error() {
        let mock = MockGenerationBackend::new().with_failure("503");
        let summarizer = Summarizer::new(Arc::new(mock));

        let err = summarizer.summarize(&note()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_schema_requires_both_fields() {
        let schema = Summarizer::schema();
        assert_eq!(schema.required, vec!["summary", "keyTakeaways"]);
    }
}
