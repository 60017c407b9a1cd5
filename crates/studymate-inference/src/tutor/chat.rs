//! Grounded tutor chat.

use std::sync::Arc;

use tracing::{field::Empty, instrument, Span};

use studymate_core::defaults::{CHAT_TEMPERATURE, EMPTY_CHAT_REPLY};
use studymate_core::{
    logging, ChatMessage, GenerationBackend, ModelRequest, ModelTier, Note, Result, Source, Turn,
};

use super::corpus;

/// Answer text plus the web sources it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// Answers questions against the corpus with web search enabled.
#[derive(Clone)]
pub struct ChatClient {
    backend: Arc<dyn GenerationBackend>,
}

impl ChatClient {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn system_instruction(notes: &[Note]) -> String {
        format!(
            "You are \"Second Brain\", a tutor focused on helping students do well in exams.\n\
             - Point out high-yield topics and how they are usually examined.\n\
             - Structure the student's notes into a coherent syllabus when useful.\n\
             - Suggest practice questions in the style of past papers.\n\
             - Use the search tool for accurate, current educational resources, but prefer \
             the uploaded notes.\n\
             - End each answer with a section titled \"### Recommended Deep Dive\" naming one \
             strong video as \"**Video Title** - *Channel Name*\" plus a one-sentence \
             description. Do not include links.\n\
             - Use LaTeX ($...$ inline, $$...$$ block) for all math and science.\n\n\
             Context:\n{}",
            corpus::documents(notes)
        )
    }

    pub fn build_request(question: &str, notes: &[Note], history: &[ChatMessage]) -> ModelRequest {
        ModelRequest::prompt(ModelTier::Fast, question)
            .with_history(history.iter().map(Turn::from))
            .with_system(Self::system_instruction(notes))
            .with_search()
            .with_temperature(CHAT_TEMPERATURE)
    }

    /// Answer `question` given prior conversation turns.
    #[instrument(
        skip(self, question, notes, history),
        fields(
            subsystem = "inference",
            component = "chat",
            op = "answer",
            history_len = history.len(),
            result_count = Empty,
        )
    )]
    pub async fn answer(
        &self,
        question: &str,
        notes: &[Note],
        history: &[ChatMessage],
    ) -> Result<ChatAnswer> {
        let request = Self::build_request(question, notes, history);
        let response = self.backend.generate(&request).await?;
        Span::current().record(logging::RESULT_COUNT, response.citations.len());

        let text = if response.text.trim().is_empty() {
            EMPTY_CHAT_REPLY.to_string()
        } else {
            response.text
        };

        Ok(ChatAnswer {
            text,
            sources: response.citations,
        })
    }
}
