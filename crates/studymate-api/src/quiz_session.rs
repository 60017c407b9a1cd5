//! Quiz session state machine.
//!
//! ```text
//! Configuring --start--> Loading --loaded--> Active{0, unanswered}
//!                           ^                   |  select
//!                           |                   v
//!                         retry          Active{i, revealed} --proceed--> Active{i+1, unanswered}
//!                           |                   |
//!                           +---- Complete <----+ proceed on the last question
//!                                    |
//! Configuring <------reset-----------+
//! ```
//!
//! The number of questions actually returned by the generator is the session
//! length, whatever count was requested.

use serde::{Deserialize, Serialize};

use studymate_core::{Error, QuestionCount, QuizDifficulty, QuizQuestion, QuizResult, Result};

/// Parameters frozen when a session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub count: QuestionCount,
    #[serde(default)]
    pub difficulty: QuizDifficulty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Configuring,
    Loading,
    Active {
        index: usize,
        selected: Option<usize>,
    },
    Complete,
}

/// Result of an option selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Option that counts for this question (the first one chosen).
    pub selected: usize,
    pub correct: bool,
    /// True when the question was already revealed and the call changed nothing.
    pub ignored: bool,
}

/// Result of moving past a revealed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(usize),
    Finished(QuizResult),
}

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    phase: Phase,
    config: QuizConfig,
    questions: Vec<QuizQuestion>,
    score: u32,
    result: Option<QuizResult>,
}

fn wrong_phase(action: &str, phase: Phase) -> Error {
    Error::InvalidState(format!("Cannot {} while quiz is {}", action, phase_name(phase)))
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Configuring => "configuring",
        Phase::Loading => "loading",
        Phase::Active { .. } => "active",
        Phase::Complete => "complete",
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> QuizConfig {
        self.config
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// `configuring -> loading`.
    pub fn start(&mut self, config: QuizConfig) -> Result<()> {
        if self.phase != Phase::Configuring {
            return Err(wrong_phase("start a quiz", self.phase));
        }
        self.config = config;
        self.enter_loading();
        Ok(())
    }

    /// `complete -> loading` with the previous parameters.
    pub fn retry(&mut self) -> Result<QuizConfig> {
        if self.phase != Phase::Complete {
            return Err(wrong_phase("retry", self.phase));
        }
        self.enter_loading();
        Ok(self.config)
    }

    /// `complete -> configuring`.
    pub fn reset(&mut self) -> Result<()> {
        if self.phase != Phase::Complete {
            return Err(wrong_phase("reconfigure", self.phase));
        }
        self.phase = Phase::Configuring;
        self.questions.clear();
        self.score = 0;
        self.result = None;
        Ok(())
    }

    fn enter_loading(&mut self) {
        self.phase = Phase::Loading;
        self.questions.clear();
        self.score = 0;
        self.result = None;
    }

    /// `loading -> active`. Returns the session length.
    ///
    /// An empty question list sends the session back to configuring.
    pub fn loaded(&mut self, questions: Vec<QuizQuestion>) -> Result<usize> {
        if self.phase != Phase::Loading {
            return Err(wrong_phase("load questions", self.phase));
        }
        if questions.is_empty() {
            self.phase = Phase::Configuring;
            return Err(Error::Schema(
                "Quiz generator returned no usable questions".to_string(),
            ));
        }
        let total = questions.len();
        self.questions = questions;
        self.phase = Phase::Active {
            index: 0,
            selected: None,
        };
        Ok(total)
    }

    /// Generation failed: `loading -> configuring`.
    pub fn abort_loading(&mut self) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Configuring;
        }
    }

    /// Reveal the current question. Only the first selection counts.
    pub fn select(&mut self, option: usize) -> Result<Selection> {
        let Phase::Active { index, selected } = self.phase else {
            return Err(wrong_phase("answer", self.phase));
        };
        let question = &self.questions[index];

        if let Some(first) = selected {
            return Ok(Selection {
                selected: first,
                correct: question.is_correct(first),
                ignored: true,
            });
        }
        if option >= question.options.len() {
            return Err(Error::InvalidInput(format!(
                "Option {} out of range for {} options",
                option,
                question.options.len()
            )));
        }

        let correct = question.is_correct(option);
        if correct {
            self.score += 1;
        }
        self.phase = Phase::Active {
            index,
            selected: Some(option),
        };
        Ok(Selection {
            selected: option,
            correct,
            ignored: false,
        })
    }

    /// Move past a revealed question, completing the session after the last one.
    pub fn proceed(&mut self) -> Result<Advance> {
        let Phase::Active { index, selected } = self.phase else {
            return Err(wrong_phase("continue", self.phase));
        };
        if selected.is_none() {
            return Err(Error::InvalidState(
                "Select an answer before continuing".to_string(),
            ));
        }

        let next = index + 1;
        if next < self.questions.len() {
            self.phase = Phase::Active {
                index: next,
                selected: None,
            };
            return Ok(Advance::Next(next));
        }

        let total = u32::try_from(self.questions.len())
            .map_err(|_| Error::Internal("Quiz too long to score".to_string()))?;
        let result = QuizResult::new(self.score, total)?;
        self.phase = Phase::Complete;
        self.result = Some(result);
        Ok(Advance::Finished(result))
    }

    /// Serializable view of the session. Answers stay hidden until revealed.
    pub fn snapshot(&self) -> QuizSnapshot {
        let (index, question) = match self.phase {
            Phase::Active { index, selected } => {
                let q = &self.questions[index];
                let view = QuestionView {
                    question: q.question.clone(),
                    options: q.options.clone(),
                    selected,
                    correct_answer: selected.map(|_| q.correct_answer),
                    explanation: selected.map(|_| q.explanation.clone()),
                };
                (Some(index), Some(view))
            }
            _ => (None, None),
        };

        QuizSnapshot {
            phase: phase_name(self.phase),
            count: self.config.count,
            difficulty: self.config.difficulty,
            total: self.questions.len(),
            index,
            question,
            score: self.score,
            result: self.result.map(|r| ResultView {
                score: r.score(),
                total: r.total(),
            }),
        }
    }
}

/// What a client sees of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub phase: &'static str,
    pub count: QuestionCount,
    pub difficulty: QuizDifficulty,
    /// Questions actually in this session.
    pub total: usize,
    pub index: Option<usize>,
    pub question: Option<QuestionView>,
    pub score: u32,
    pub result: Option<ResultView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub question: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub correct_answer: Option<usize>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub score: u32,
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            question: "Which organelle makes ATP?".to_string(),
            options: vec![
                "Nucleus".to_string(),
                "Mitochondrion".to_string(),
                "Ribosome".to_string(),
                "Golgi".to_string(),
            ],
            correct_answer: correct,
            explanation: "Oxidative phosphorylation.".to_string(),
        }
    }

    fn active(n: usize) -> QuizSession {
        let mut session = QuizSession::new();
        session.start(QuizConfig::default()).unwrap();
        session.loaded((0..n).map(|_| question(1)).collect()).unwrap();
        session
    }

    #[test]
    fn test_starts_configuring() {
        let session = QuizSession::new();
        let snap = session.snapshot();
        assert_eq!(snap.phase, "configuring");
        assert_eq!(snap.count.get(), 20);
        assert_eq!(snap.difficulty, QuizDifficulty::Rigorous);
        assert!(snap.question.is_none());
    }

    #[test]
    fn test_start_freezes_config() {
        let mut session = QuizSession::new();
        let config = QuizConfig {
            count: QuestionCount::try_from(10).unwrap(),
            difficulty: QuizDifficulty::Elite,
        };
        session.start(config).unwrap();
        assert!(session.is_loading());
        assert_eq!(session.config(), config);
        assert!(session.start(QuizConfig::default()).is_err());
        assert_eq!(session.config(), config);
    }

    #[test]
    fn test_empty_generation_returns_to_configuring() {
        let mut session = QuizSession::new();
        session.start(QuizConfig::default()).unwrap();
        let err = session.loaded(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(session.snapshot().phase, "configuring");
    }

    #[test]
    fn test_abort_loading() {
        let mut session = QuizSession::new();
        session.start(QuizConfig::default()).unwrap();
        session.abort_loading();
        assert_eq!(session.snapshot().phase, "configuring");
    }

    #[test]
    fn test_answer_hidden_until_revealed() {
        let mut session = active(2);
        let q = session.snapshot().question.unwrap();
        assert_eq!(q.correct_answer, None);
        assert_eq!(q.explanation, None);

        session.select(0).unwrap();
        let q = session.snapshot().question.unwrap();
        assert_eq!(q.selected, Some(0));
        assert_eq!(q.correct_answer, Some(1));
        assert!(q.explanation.is_some());
    }

    #[test]
    fn test_reselect_is_ignored() {
        let mut session = active(1);
        let first = session.select(0).unwrap();
        assert!(!first.correct);
        assert!(!first.ignored);

        let second = session.select(1).unwrap();
        assert!(second.ignored);
        assert_eq!(second.selected, 0);
        assert_eq!(session.snapshot().score, 0);
        assert_eq!(session.snapshot().question.unwrap().selected, Some(0));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = active(1);
        assert!(matches!(session.select(4), Err(Error::InvalidInput(_))));
        // Still unanswered.
        assert!(session.select(1).unwrap().correct);
    }

    #[test]
    fn test_proceed_requires_reveal() {
        let mut session = active(2);
        assert!(matches!(session.proceed(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_short_generation_sets_total() {
        let mut session = QuizSession::new();
        session.start(QuizConfig::default()).unwrap();
        let total = session.loaded((0..18).map(|_| question(1)).collect()).unwrap();
        assert_eq!(total, 18);

        let mut result = None;
        for i in 0..18 {
            session.select(if i % 2 == 0 { 1 } else { 2 }).unwrap();
            match session.proceed().unwrap() {
                Advance::Next(next) => assert_eq!(next, i + 1),
                Advance::Finished(r) => result = Some(r),
            }
        }

        let result = result.unwrap();
        assert_eq!(result.total(), 18);
        assert_eq!(result.score(), 9);
        let snap = session.snapshot();
        assert_eq!(snap.phase, "complete");
        assert_eq!(snap.count.get(), 20);
        assert_eq!(snap.result, Some(ResultView { score: 9, total: 18 }));
    }

    #[test]
    fn test_retry_keeps_config() {
        let mut session = QuizSession::new();
        let config = QuizConfig {
            count: QuestionCount::try_from(30).unwrap(),
            difficulty: QuizDifficulty::Foundational,
        };
        session.start(config).unwrap();
        session.loaded(vec![question(0)]).unwrap();
        session.select(0).unwrap();
        session.proceed().unwrap();

        assert_eq!(session.retry().unwrap(), config);
        let snap = session.snapshot();
        assert_eq!(snap.phase, "loading");
        assert_eq!(snap.score, 0);
        assert_eq!(snap.total, 0);
        assert!(snap.result.is_none());
    }

    #[test]
    fn test_reset_only_from_complete() {
        let mut session = active(1);
        assert!(session.reset().is_err());
        assert!(session.retry().is_err());
        session.select(1).unwrap();
        session.proceed().unwrap();
        session.reset().unwrap();
        assert_eq!(session.snapshot().phase, "configuring");
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: QuizConfig = serde_json::from_str(r#"{"difficulty":"Elite"}"#).unwrap();
        assert_eq!(config.count.get(), 20);
        assert_eq!(config.difficulty, QuizDifficulty::Elite);
        assert!(serde_json::from_str::<QuizConfig>(r#"{"count":15}"#).is_err());
    }
}
