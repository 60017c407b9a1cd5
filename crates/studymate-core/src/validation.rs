//! Validation boundary for structured model output.
//!
//! Nothing a model returns is trusted until it has been decoded into the
//! expected type and passed [`Validate`]. Callers match on
//! [`ResponseOutcome`] to apply their own fallback policy.

use serde::de::DeserializeOwned;

use crate::defaults::QUIZ_OPTION_COUNT;
use crate::error::{Error, Result};
use crate::models::{LessonDrill, ProgressAnalysis, QuizQuestion, SummaryResponse};

/// Result of one structured model call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome<T> {
    /// Decoded and validated value.
    Ok(T),
    /// The model answered, but not in the requested shape.
    SchemaError(String),
    /// The call itself failed (network, provider, timeout).
    TransportError(String),
}

impl<T> ResponseOutcome<T> {
    /// Classify a backend result and decode its text as `T`.
    pub fn from_response(result: Result<String>) -> Self
    where
        T: DeserializeOwned + Validate,
    {
        match result {
            Ok(text) => match decode_payload::<T>(&text) {
                Ok(value) => ResponseOutcome::Ok(value),
                Err(e) => ResponseOutcome::SchemaError(e.to_string()),
            },
            // Any backend failure means no model output reached us.
            Err(e) => ResponseOutcome::TransportError(e.to_string()),
        }
    }

    /// Convert into a `Result`, mapping each failure to its error variant.
    pub fn into_result(self) -> Result<T> {
        match self {
            ResponseOutcome::Ok(v) => Ok(v),
            ResponseOutcome::SchemaError(e) => Err(Error::Schema(e)),
            ResponseOutcome::TransportError(e) => Err(Error::Inference(e)),
        }
    }
}

/// Business-rule checks applied after a value decodes.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<()> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl Validate for SummaryResponse {
    fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() {
            return Err(Error::Schema("summary is empty".to_string()));
        }
        Ok(())
    }
}

impl Validate for QuizQuestion {
    fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::Schema("question text is empty".to_string()));
        }
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(Error::Schema(format!(
                "expected {} options, got {}",
                QUIZ_OPTION_COUNT,
                self.options.len()
            )));
        }
        if self.correct_answer >= self.options.len() {
            return Err(Error::Schema(format!(
                "correctAnswer {} out of range",
                self.correct_answer
            )));
        }
        Ok(())
    }
}

fn check_percentage(field: &str, value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(Error::Schema(format!(
            "{} must be within 0-100, got {}",
            field, value
        )));
    }
    Ok(())
}

impl Validate for ProgressAnalysis {
    fn validate(&self) -> Result<()> {
        check_percentage("overallMastery", self.overall_mastery)?;
        for subject in &self.subjects {
            if subject.name.trim().is_empty() {
                return Err(Error::Schema("subject name is empty".to_string()));
            }
            check_percentage("masteryScore", subject.mastery_score)?;
            check_percentage("completionPercentage", subject.completion_percentage)?;
        }
        Ok(())
    }
}

impl Validate for LessonDrill {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("conceptExplanation", &self.concept_explanation),
            ("exampleProblem", &self.example_problem),
            ("exampleSolution", &self.example_solution),
            ("practiceQuestion", &self.practice_question),
            ("practiceAnswer", &self.practice_answer),
            ("practiceExplanation", &self.practice_explanation),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::Schema(format!("{} is empty", name)));
            }
        }
        Ok(())
    }
}

/// Strip markdown code fences some models wrap around JSON output.
pub fn extract_json_payload(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Decode and validate a model payload.
pub fn decode_payload<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let payload = extract_json_payload(text);
    let value: T = serde_json::from_str(payload).map_err(|e| Error::Schema(e.to_string()))?;
    value.validate()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"{"summary": "Cells divide.", "keyTakeaways": ["mitosis"]}"#;

    #[test]
    fn test_extract_json_payload_strips_fences() {
        let fenced = format!("```json\n{}\n```", SUMMARY);
        assert_eq!(extract_json_payload(&fenced), SUMMARY);
        assert_eq!(extract_json_payload(SUMMARY), SUMMARY);
    }

    #[test]
    fn test_outcome_ok() {
        let outcome = ResponseOutcome::<SummaryResponse>::from_response(Ok(SUMMARY.to_string()));
        match outcome {
            ResponseOutcome::Ok(s) => assert_eq!(s.key_takeaways, vec!["mitosis"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_outcome_schema_error_on_garbage() {
        let outcome =
            ResponseOutcome::<SummaryResponse>::from_response(Ok("not json at all".to_string()));
        assert!(matches!(outcome, ResponseOutcome::SchemaError(_)));
    }

    #[test]
    fn test_outcome_schema_error_on_wrong_shape() {
        let outcome =
            ResponseOutcome::<SummaryResponse>::from_response(Ok(r#"{"summary": 3}"#.to_string()));
        assert!(matches!(outcome, ResponseOutcome::SchemaError(_)));
    }

    #[test]
    fn test_outcome_transport_error() {
        let outcome = ResponseOutcome::<SummaryResponse>::from_response(Err(Error::Inference(
            "503 unavailable".to_string(),
        )));
        assert!(matches!(outcome, ResponseOutcome::TransportError(_)));
        assert!(outcome.into_result().unwrap_err().is_transport());
    }

    #[test]
    fn test_outcome_config_failure_is_not_a_schema_error() {
        let outcome = ResponseOutcome::<SummaryResponse>::from_response(Err(Error::Config(
            "Authentication failed".to_string(),
        )));
        assert!(matches!(outcome, ResponseOutcome::TransportError(_)));
    }

    fn question(options: usize, answer: usize) -> QuizQuestion {
        QuizQuestion {
            question: "Which organelle makes ATP?".to_string(),
            options: (0..options).map(|i| format!("option {}", i)).collect(),
            correct_answer: answer,
            explanation: "Mitochondria.".to_string(),
        }
    }

    #[test]
    fn test_quiz_question_validation() {
        assert!(question(4, 3).validate().is_ok());
        assert!(question(3, 0).validate().is_err());
        assert!(question(4, 4).validate().is_err());
        let mut blank = question(4, 0);
        blank.question = "  ".to_string();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_progress_validation_range() {
        let mut progress = ProgressAnalysis::default();
        assert!(progress.validate().is_ok());
        progress.overall_mastery = 140.0;
        assert!(progress.validate().is_err());
    }

    #[test]
    fn test_drill_validation_requires_all_fields() {
        let drill = LessonDrill {
            concept_explanation: "x".into(),
            example_problem: "x".into(),
            example_solution: "x".into(),
            practice_question: "x".into(),
            practice_answer: "".into(),
            practice_explanation: "x".into(),
        };
        let err = drill.validate().unwrap_err();
        assert!(err.to_string().contains("practiceAnswer"));
    }
}
