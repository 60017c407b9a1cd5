//! Multiple-choice quiz generation.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, field::Empty, instrument, warn, Span};

use studymate_core::{
    extract_json_payload, logging, Error, GenerationBackend, ModelRequest, ModelTier, Note,
    QuestionCount, QuizDifficulty, QuizQuestion, Result, ResponseSchema, Validate,
};

use super::corpus;

/// Generates quizzes from the note corpus.
#[derive(Clone)]
pub struct QuizGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl QuizGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn schema() -> ResponseSchema {
        ResponseSchema::array(ResponseSchema::object([
            ("question", ResponseSchema::string()),
            ("options", ResponseSchema::array(ResponseSchema::string())),
            (
                "correctAnswer",
                ResponseSchema::integer().describe("Zero-based index of the correct option (0-3)"),
            ),
            ("explanation", ResponseSchema::string()),
        ]))
    }

    pub fn build_request(
        notes: &[Note],
        count: QuestionCount,
        difficulty: QuizDifficulty,
    ) -> ModelRequest {
        let prompt = format!(
            "Write a {count}-question multiple-choice quiz for an IGCSE Grade 10 student.\n\
             Difficulty: {difficulty}. {framing}\n\n\
             Requirements:\n\
             1. Each question has exactly 4 options.\n\
             2. Put every symbol, variable, formula and equation in LaTeX, in options too.\n\
             3. The explanation walks through the reasoning, also in LaTeX.\n\
             4. Return valid JSON; escape backslashes (\"\\\\frac\").\n\n\
             Study notes:\n{context}",
            count = count,
            difficulty = difficulty,
            framing = difficulty.framing(),
            context = corpus::plain(notes),
        );
        ModelRequest::prompt(ModelTier::Reasoning, prompt).with_schema(Self::schema())
    }

    /// Generate up to `count` questions.
    ///
    /// Output that is not a JSON array yields an empty list. Individual items
    /// that fail to decode or break the question invariants are dropped, so
    /// the result can be shorter than requested. A failed call is an error.
    #[instrument(
        skip(self, notes),
        fields(
            subsystem = "inference",
            component = "quiz_generator",
            op = "generate_quiz",
            count = %count,
            difficulty = %difficulty,
            result_count = Empty,
        )
    )]
    pub async fn generate(
        &self,
        notes: &[Note],
        count: QuestionCount,
        difficulty: QuizDifficulty,
    ) -> Result<Vec<QuizQuestion>> {
        let request = Self::build_request(notes, count, difficulty);
        let response = self
            .backend
            .generate(&request)
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;

        let questions = parse_questions(&response.text);
        Span::current().record(logging::RESULT_COUNT, questions.len());
        if questions.len() != count.get() as usize {
            debug!(
                requested = count.get(),
                received = questions.len(),
                "Quiz length differs from request"
            );
        }
        Ok(questions)
    }
}

/// Decode a question array item by item, keeping only valid questions.
pub fn parse_questions(text: &str) -> Vec<QuizQuestion> {
    let items: Vec<JsonValue> = match serde_json::from_str(extract_json_payload(text)) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Quiz output is not a JSON array");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let question = serde_json::from_value::<QuizQuestion>(item)
                .map_err(|e| e.to_string())
                .and_then(|q| q.validate().map(|_| q).map_err(|e| e.to_string()));
            match question {
                Ok(q) => Some(q),
                Err(e) => {
                    warn!(index, error = %e, "Dropping invalid quiz question");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use serde_json::json;
    use studymate_core::NoteType;

    fn question_json(i: usize) -> JsonValue {
        json!({
            "question": format!("Question {}?", i),
            "options": ["A", "B", "C", "D"],
            "correctAnswer": i % 4,
            "explanation": "Because."
        })
    }

    #[test]
    fn test_parse_questions_keeps_valid_items() {
        let text = serde_json::to_string(&vec![question_json(0), question_json(1)]).unwrap();
        let questions = parse_questions(&text);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].correct_answer, 1);
    }

    #[test]
    fn test_parse_questions_drops_invalid_items() {
        let text = json!([
            question_json(0),
            {"question": "Three options?", "options": ["A", "B", "C"], "correctAnswer": 0, "explanation": "x"},
            {"question": "Out of range?", "options": ["A", "B", "C", "D"], "correctAnswer": 7, "explanation": "x"},
            {"question": "Missing fields"},
            question_json(3),
        ])
        .to_string();
        let questions = parse_questions(&text);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Question 0?");
        assert_eq!(questions[1].question, "Question 3?");
    }

    #[test]
    fn test_parse_questions_garbage_is_empty() {
        assert!(parse_questions("I cannot do that.").is_empty());
        assert!(parse_questions(r#"{"question": "not an array"}"#).is_empty());
    }

    #[test]
    fn test_parse_questions_fenced() {
        let text = format!(
            "```json\n{}\n```",
            serde_json::to_string(&vec![question_json(2)]).unwrap()
        );
        assert_eq!(parse_questions(&text).len(), 1);
    }

    #[test]
    fn test_build_request_includes_framing() {
        let notes = vec![Note::new("cells.txt", "Cells divide.", NoteType::Text)];
        let request = QuizGenerator::build_request(
            &notes,
            QuestionCount::try_from(30).unwrap(),
            QuizDifficulty::Elite,
        );
        let prompt = &request.contents[0].text;
        assert_eq!(request.tier, ModelTier::Reasoning);
        assert!(prompt.contains("30-question"));
        assert!(prompt.contains("Elite"));
        assert!(prompt.contains(QuizDifficulty::Elite.framing()));
        assert!(prompt.contains("Cells divide."));
    }

    #[tokio::test]
    async fn test_generate_returns_short_quiz() {
        let items: Vec<_> = (0..18).map(question_json).collect();
        let mock = MockGenerationBackend::new()
            .with_response(serde_json::to_string(&items).unwrap());
        let generator = QuizGenerator::new(Arc::new(mock));

        let questions = generator
            .generate(&[], QuestionCount::default(), QuizDifficulty::Rigorous)
            .await
            .unwrap();
        assert_eq!(questions.len(), 18);
    }

    #[tokio::test]
    async fn test_generate_transport_failure() {
        let mock = MockGenerationBackend::new().with_failure("timeout");
        let generator = QuizGenerator::new(Arc::new(mock));

        let result = generator
            .generate(&[], QuestionCount::default(), QuizDifficulty::Standard)
            .await;
        assert!(result.unwrap_err().is_transport());
    }

    struct UnauthorizedBackend;

    #[async_trait::async_trait]
    impl GenerationBackend for UnauthorizedBackend {
        async fn generate(&self, _request: &ModelRequest) -> Result<studymate_core::ModelResponse> {
            Err(Error::Config("API key not valid".to_string()))
        }

        fn model_name(&self, _tier: ModelTier) -> &str {
            "unauthorized"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_generate_provider_error_is_inference() {
        let generator = QuizGenerator::new(Arc::new(UnauthorizedBackend));

        let err = generator
            .generate(&[], QuestionCount::default(), QuizDifficulty::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)), "got {:?}", err);
        assert!(err.to_string().contains("API key not valid"));
    }
}
