//! Progress analysis across notes and quiz history.

use std::sync::Arc;

use tracing::{instrument, warn};

use studymate_core::{
    Error, GenerationBackend, ModelRequest, ModelTier, Note, ProgressAnalysis, QuizResult,
    ResponseOutcome, ResponseSchema, Result,
};

use super::corpus;

/// Produces a [`ProgressAnalysis`] from the corpus and quiz history.
#[derive(Clone)]
pub struct ProgressAnalyzer {
    backend: Arc<dyn GenerationBackend>,
}

impl ProgressAnalyzer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn schema() -> ResponseSchema {
        let topics = || ResponseSchema::array(ResponseSchema::string());
        let subject = ResponseSchema::object([
            ("name", ResponseSchema::string()),
            ("strength", topics()),
            ("weakness", topics()),
            ("masteryScore", ResponseSchema::number()),
            ("completionPercentage", ResponseSchema::number()),
            ("highYieldTopics", topics()),
        ]);

        ResponseSchema::object([
            ("overallMastery", ResponseSchema::number()),
            ("studyTimeEstimate", ResponseSchema::string()),
            ("streakCount", ResponseSchema::integer()),
            ("subjects", ResponseSchema::array(subject)),
        ])
    }

    pub fn build_request(notes: &[Note], history: &[QuizResult]) -> ModelRequest {
        let prompt = format!(
            "Audit this student's learning. Combine the study notes with the quiz \
             performance history to find precise knowledge gaps and estimate mastery \
             per subject. Percentages are on a 0-100 scale.\n\n\
             Notes repository:\n{}\n\n\
             Performance history:\n{}",
            corpus::topics(notes),
            corpus::quiz_history(history),
        );
        ModelRequest::prompt(ModelTier::Reasoning, prompt).with_schema(Self::schema())
    }

    /// Analyze progress.
    ///
    /// Output that does not match the schema yields the zeroed
    /// [`ProgressAnalysis::default`]; a failed call is an error.
    #[instrument(
        skip(self, notes, history),
        fields(
            subsystem = "inference",
            component = "progress_analyzer",
            op = "analyze_progress",
            notes = notes.len(),
            quizzes = history.len(),
        )
    )]
    pub async fn analyze(&self, notes: &[Note], history: &[QuizResult]) -> Result<ProgressAnalysis> {
        let request = Self::build_request(notes, history);
        let result = self.backend.generate(&request).await.map(|r| r.text);

        match ResponseOutcome::<ProgressAnalysis>::from_response(result) {
            ResponseOutcome::Ok(analysis) => Ok(analysis),
            ResponseOutcome::SchemaError(e) => {
                warn!(error = %e, "Progress analysis did not match schema, using zero default");
                Ok(ProgressAnalysis::default())
            }
            ResponseOutcome::TransportError(e) => Err(Error::Inference(e)),
        }
    }
}
