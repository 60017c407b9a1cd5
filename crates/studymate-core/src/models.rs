//! Domain models for the study session.
//!
//! Field names on the model-facing types (`SummaryResponse`, `QuizQuestion`,
//! `ProgressAnalysis`, `LessonDrill`) follow the camelCase keys requested in
//! the response schemas, so the same types decode model output and serialize
//! API responses.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{STUDY_TIME_FALLBACK, SUMMARY_FALLBACK, UNTITLED_NOTE};
use crate::error::{Error, Result};

// =============================================================================
// NOTES
// =============================================================================

/// Source format of an ingested note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Pdf,
    Text,
}

/// An ingested document with its extracted text and optional AI summary.
///
/// Summary fields start empty and are written only through
/// [`Note::attach_summary`], which the summarization step calls.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    id: Uuid,
    name: String,
    content: String,
    #[serde(rename = "type")]
    note_type: NoteType,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_takeaways: Option<Vec<String>>,
}

impl Note {
    /// Create a note with a fresh UUIDv7 and the current timestamp.
    pub fn new(name: impl Into<String>, content: impl Into<String>, note_type: NoteType) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            UNTITLED_NOTE.to_string()
        } else {
            name
        };

        Self {
            id: Uuid::now_v7(),
            name,
            content: content.into(),
            note_type,
            created_at: Utc::now(),
            summary: None,
            key_takeaways: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn note_type(&self) -> NoteType {
        self.note_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn key_takeaways(&self) -> Option<&[String]> {
        self.key_takeaways.as_deref()
    }

    /// Attach the result of a summarization call, replacing any earlier one.
    pub fn attach_summary(&mut self, summary: SummaryResponse) {
        self.summary = Some(summary.summary);
        self.key_takeaways = Some(summary.key_takeaways);
    }
}

/// Structured summary returned by the summarization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: String,
    pub key_takeaways: Vec<String>,
}

impl SummaryResponse {
    /// Fixed value used when the model's summary cannot be decoded.
    pub fn fallback() -> Self {
        Self {
            summary: SUMMARY_FALLBACK.to_string(),
            key_takeaways: Vec::new(),
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A web source cited by a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// One entry in the tutor conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            sources,
        }
    }
}

// =============================================================================
// QUIZZES
// =============================================================================

/// A multiple-choice question produced by the quiz generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

/// Difficulty tier for a generated quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuizDifficulty {
    Foundational,
    Standard,
    #[default]
    Rigorous,
    Elite,
}

impl QuizDifficulty {
    pub const ALL: [QuizDifficulty; 4] = [
        QuizDifficulty::Foundational,
        QuizDifficulty::Standard,
        QuizDifficulty::Rigorous,
        QuizDifficulty::Elite,
    ];

    /// How questions at this tier should be framed for the generator.
    pub fn framing(&self) -> &'static str {
        match self {
            Self::Foundational => {
                "Test core concepts and precise definitions with direct, single-step application."
            }
            Self::Standard => {
                "Use typical exam-style questions that check understanding and routine problem solving."
            }
            Self::Rigorous => {
                "Use multi-step reasoning, plausible distractors and subtle conceptual traps."
            }
            Self::Elite => {
                "Use very demanding application questions that require full mastery and lateral thinking."
            }
        }
    }
}

impl fmt::Display for QuizDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Foundational => "Foundational",
            Self::Standard => "Standard",
            Self::Rigorous => "Rigorous",
            Self::Elite => "Elite",
        };
        f.write_str(name)
    }
}

impl FromStr for QuizDifficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "foundational" => Ok(Self::Foundational),
            "standard" => Ok(Self::Standard),
            "rigorous" => Ok(Self::Rigorous),
            "elite" => Ok(Self::Elite),
            _ => Err(Error::InvalidInput(format!("Unknown difficulty: {}", s))),
        }
    }
}

/// Number of questions requested from the generator: one of 10, 20, 30, 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuestionCount(u32);

impl QuestionCount {
    pub const ALLOWED: [u32; 4] = [10, 20, 30, 40];

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(20)
    }
}

impl TryFrom<u32> for QuestionCount {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidInput(format!(
                "Question count must be one of {:?}, got {}",
                Self::ALLOWED,
                value
            )))
        }
    }
}

impl From<QuestionCount> for u32 {
    fn from(count: QuestionCount) -> Self {
        count.0
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one completed quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    score: u32,
    total: u32,
    timestamp: DateTime<Utc>,
}

impl QuizResult {
    /// Build a result, enforcing `total > 0` and `score <= total`.
    pub fn new(score: u32, total: u32) -> Result<Self> {
        if total == 0 {
            return Err(Error::InvalidInput(
                "Quiz result total must be positive".to_string(),
            ));
        }
        if score > total {
            return Err(Error::InvalidInput(format!(
                "Quiz score {} exceeds total {}",
                score, total
            )));
        }
        Ok(Self {
            score,
            total,
            timestamp: Utc::now(),
        })
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

/// Mastery breakdown for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProgress {
    pub name: String,
    pub strength: Vec<String>,
    pub weakness: Vec<String>,
    pub mastery_score: f64,
    pub completion_percentage: f64,
    pub high_yield_topics: Vec<String>,
}

/// Full progress audit across all notes and quiz history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAnalysis {
    pub overall_mastery: f64,
    pub study_time_estimate: String,
    pub streak_count: u32,
    pub subjects: Vec<SubjectProgress>,
}

impl Default for ProgressAnalysis {
    fn default() -> Self {
        Self {
            overall_mastery: 0.0,
            study_time_estimate: STUDY_TIME_FALLBACK.to_string(),
            streak_count: 0,
            subjects: Vec::new(),
        }
    }
}

impl ProgressAnalysis {
    /// True when `topic` is listed as a weakness of `subject`.
    pub fn has_weakness(&self, topic: &str, subject: &str) -> bool {
        self.subjects
            .iter()
            .filter(|s| s.name == subject)
            .any(|s| s.weakness.iter().any(|w| w == topic))
    }

    /// Every `(topic, subject)` pair available for a lesson drill.
    pub fn weak_topics(&self) -> Vec<DrillTopic> {
        self.subjects
            .iter()
            .flat_map(|s| {
                s.weakness.iter().map(move |w| DrillTopic {
                    topic: w.clone(),
                    subject: s.name.clone(),
                })
            })
            .collect()
    }
}

/// Mastery realized in quizzes: `round(100 * sum(score) / sum(total))`.
///
/// Returns `None` for an empty history.
pub fn realized_mastery(history: &[QuizResult]) -> Option<u32> {
    let total: u64 = history.iter().map(|r| u64::from(r.total())).sum();
    if total == 0 {
        return None;
    }
    let correct: u64 = history.iter().map(|r| u64::from(r.score())).sum();
    Some(((correct as f64 / total as f64) * 100.0).round() as u32)
}

// =============================================================================
// LESSONS
// =============================================================================

/// A weak topic selected for a lesson drill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillTopic {
    pub topic: String,
    pub subject: String,
}

/// A generated single-topic teaching unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDrill {
    pub concept_explanation: String,
    pub example_problem: String,
    pub example_solution: String,
    pub practice_question: String,
    pub practice_answer: String,
    pub practice_explanation: String,
}
