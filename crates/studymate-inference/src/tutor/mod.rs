//! Tutor clients: one per AI-backed feature, all sharing a backend.

pub mod chat;
pub mod corpus;
pub mod lesson;
pub mod progress;
pub mod quiz;
pub mod summarize;

use std::sync::Arc;

use studymate_core::GenerationBackend;

pub use chat::{ChatAnswer, ChatClient};
pub use lesson::DrillGenerator;
pub use progress::ProgressAnalyzer;
pub use quiz::{parse_questions, QuizGenerator};
pub use summarize::Summarizer;

/// Every tutor client, wired to the same generation backend.
#[derive(Clone)]
pub struct Tutor {
    pub summarizer: Summarizer,
    pub quiz: QuizGenerator,
    pub progress: ProgressAnalyzer,
    pub drills: DrillGenerator,
    pub chat: ChatClient,
}

impl Tutor {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            summarizer: Summarizer::new(backend.clone()),
            quiz: QuizGenerator::new(backend.clone()),
            progress: ProgressAnalyzer::new(backend.clone()),
            drills: DrillGenerator::new(backend.clone()),
            chat: ChatClient::new(backend),
        }
    }
}
