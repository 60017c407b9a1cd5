//! # studymate-inference
//!
//! Model backend and tutor clients for studymate.
//!
//! This crate provides:
//! - The Gemini `generateContent` backend
//! - Tutor clients for summaries, quizzes, progress audits, lesson drills and chat
//! - A scripted mock backend (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studymate_inference::{GeminiBackend, Tutor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::from_env().unwrap();
//!     let tutor = Tutor::new(Arc::new(backend));
//!     let answer = tutor.chat.answer("What is osmosis?", &[], &[]).await.unwrap();
//!     println!("{}", answer.text);
//! }
//! ```

pub mod gemini;
pub mod tutor;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use studymate_core::*;

pub use gemini::{GeminiBackend, GeminiConfig};
pub use tutor::{
    ChatAnswer, ChatClient, DrillGenerator, ProgressAnalyzer, QuizGenerator, Summarizer, Tutor,
};
