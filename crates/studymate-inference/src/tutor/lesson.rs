//! Single-topic lesson drills.

use std::sync::Arc;

use tracing::instrument;

use studymate_core::{
    DrillTopic, GenerationBackend, LessonDrill, ModelRequest, ModelTier, Note, ResponseOutcome,
    ResponseSchema, Result,
};

use super::corpus;

/// Generates a six-part drill for one weak topic.
#[derive(Clone)]
pub struct DrillGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl DrillGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn schema() -> ResponseSchema {
        ResponseSchema::object([
            ("conceptExplanation", ResponseSchema::string()),
            ("exampleProblem", ResponseSchema::string()),
            ("exampleSolution", ResponseSchema::string()),
            ("practiceQuestion", ResponseSchema::string()),
            ("practiceAnswer", ResponseSchema::string()),
            ("practiceExplanation", ResponseSchema::string()),
        ])
    }

    pub fn build_request(topic: &DrillTopic, notes: &[Note]) -> ModelRequest {
        let prompt = format!(
            "Build an interactive lesson drill on \"{}\" ({}): explain the concept, work \
             one example, then set one practice question with its answer and explanation.\n\
             All mathematical and scientific notation must be LaTeX ($...$ or $$...$$).\n\n\
             Context:\n{}",
            topic.topic,
            topic.subject,
            corpus::plain(notes),
        );
        ModelRequest::prompt(ModelTier::Reasoning, prompt).with_schema(Self::schema())
    }

    /// Generate a drill. Schema and transport failures are both errors.
    #[instrument(
        skip(self, notes),
        fields(
            subsystem = "inference",
            component = "drill_generator",
            op = "generate_drill",
            topic = %topic.topic,
            subject = %topic.subject,
        )
    )]
    pub async fn generate(&self, topic: &DrillTopic, notes: &[Note]) -> Result<LessonDrill> {
        let request = Self::build_request(topic, notes);
        let result = self.backend.generate(&request).await.map(|r| r.text);
        ResponseOutcome::<LessonDrill>::from_response(result).into_result()
    }
}
