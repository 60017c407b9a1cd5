//! Application state controller.
//!
//! All session state lives in one [`AppState`] owned by a single task.
//! Callers talk to it through a [`ControllerHandle`]: every operation is a
//! [`Command`] on a bounded queue, applied strictly in arrival order
//! (model calls included), with the result sent back on a oneshot channel.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use studymate_core::defaults::{CHAT_APOLOGY, PROGRESS_MIN_QUIZZES};
use studymate_core::{
    realized_mastery, ChatMessage, DrillTopic, Error, EventBus, LessonDrill, Note,
    ProgressAnalysis, QuizResult, Result, StudyEvent, UploadedFile,
};
use studymate_inference::Tutor;
use studymate_ingest::{IngestFailure, IngestPipeline};

use crate::quiz_session::{Advance, QuizConfig, QuizSession, QuizSnapshot, Selection};

/// Everything the session knows. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct AppState {
    pub notes: Vec<Note>,
    pub chat: Vec<ChatMessage>,
    pub history: Vec<QuizResult>,
    pub progress: Option<ProgressAnalysis>,
    pub session: QuizSession,
    pub drill: Option<ActiveDrill>,
}

/// The open lesson drill and the topic it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDrill {
    #[serde(flatten)]
    pub topic: DrillTopic,
    pub drill: LessonDrill,
}

/// Notes added by one upload batch plus the files that were dropped.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub notes: Vec<Note>,
    pub failures: Vec<IngestFailure>,
}

/// Progress as the client may show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressView {
    NoNotes,
    /// Withheld until enough quizzes are completed.
    InsufficientData {
        completed_quizzes: usize,
        required_quizzes: usize,
    },
    /// Enough data, but the last analysis failed.
    Unavailable,
    Ready {
        analysis: ProgressAnalysis,
        realized_mastery: u32,
        /// Weak topics a lesson drill can be opened for.
        drill_topics: Vec<DrillTopic>,
    },
}

type Reply<T> = oneshot::Sender<Result<T>>;

/// Operations accepted by the controller.
#[derive(Debug)]
pub enum Command {
    AddFiles {
        files: Vec<UploadedFile>,
        reply: Reply<IngestSummary>,
    },
    ListNotes {
        reply: Reply<Vec<Note>>,
    },
    Ask {
        question: String,
        reply: Reply<ChatMessage>,
    },
    GetChat {
        reply: Reply<Vec<ChatMessage>>,
    },
    StartQuiz {
        config: QuizConfig,
        reply: Reply<QuizSnapshot>,
    },
    SelectAnswer {
        option: usize,
        reply: Reply<Selection>,
    },
    Proceed {
        reply: Reply<QuizSnapshot>,
    },
    Retry {
        reply: Reply<QuizSnapshot>,
    },
    Reset {
        reply: Reply<QuizSnapshot>,
    },
    GetQuiz {
        reply: Reply<QuizSnapshot>,
    },
    GetProgress {
        reply: Reply<ProgressView>,
    },
    OpenDrill {
        topic: DrillTopic,
        reply: Reply<ActiveDrill>,
    },
    GetDrill {
        reply: Reply<Option<ActiveDrill>>,
    },
    CloseDrill {
        reply: Reply<()>,
    },
}

pub struct Controller {
    state: AppState,
    tutor: Tutor,
    pipeline: IngestPipeline,
    events: EventBus,
}

impl Controller {
    pub fn new(tutor: Tutor, pipeline: IngestPipeline, events: EventBus) -> Self {
        Self {
            state: AppState::default(),
            tutor,
            pipeline,
            events,
        }
    }

    /// Spawn the controller task and return a handle to it.
    ///
    /// The task stops once every handle has been dropped.
    pub fn start(self, capacity: usize) -> ControllerHandle {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(self.run(rx));
        ControllerHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!("Controller started");
        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }
        info!("Controller stopped");
    }

    async fn handle(&mut self, command: Command) {
        // A dropped receiver means the caller went away; the state change stands.
        match command {
            Command::AddFiles { files, reply } => {
                let _ = reply.send(self.add_files(files).await);
            }
            Command::ListNotes { reply } => {
                let _ = reply.send(Ok(self.state.notes.clone()));
            }
            Command::Ask { question, reply } => {
                let _ = reply.send(self.ask(question).await);
            }
            Command::GetChat { reply } => {
                let _ = reply.send(Ok(self.state.chat.clone()));
            }
            Command::StartQuiz { config, reply } => {
                let _ = reply.send(self.start_quiz(config).await);
            }
            Command::SelectAnswer { option, reply } => {
                let _ = reply.send(self.state.session.select(option));
            }
            Command::Proceed { reply } => {
                let _ = reply.send(self.proceed().await);
            }
            Command::Retry { reply } => {
                let _ = reply.send(self.retry_quiz().await);
            }
            Command::Reset { reply } => {
                let result = self.state.session.reset().map(|_| self.state.session.snapshot());
                let _ = reply.send(result);
            }
            Command::GetQuiz { reply } => {
                let _ = reply.send(Ok(self.state.session.snapshot()));
            }
            Command::GetProgress { reply } => {
                let _ = reply.send(Ok(self.progress_view()));
            }
            Command::OpenDrill { topic, reply } => {
                let _ = reply.send(self.open_drill(topic).await);
            }
            Command::GetDrill { reply } => {
                let _ = reply.send(Ok(self.state.drill.clone()));
            }
            Command::CloseDrill { reply } => {
                self.state.drill = None;
                let _ = reply.send(Ok(()));
            }
        }
    }

    #[instrument(
        skip(self, files),
        fields(subsystem = "api", component = "controller", op = "add_files", files = files.len())
    )]
    async fn add_files(&mut self, files: Vec<UploadedFile>) -> Result<IngestSummary> {
        if files.is_empty() {
            return Err(Error::InvalidInput("No files uploaded".to_string()));
        }

        let report = self.pipeline.ingest_batch(files).await;
        for note in &report.notes {
            self.events.emit(StudyEvent::NoteAdded {
                note_id: note.id(),
                name: note.name().to_string(),
            });
        }

        let added = report.notes.clone();
        self.state.notes.extend(report.notes);
        if !added.is_empty() {
            self.refresh_progress().await;
        }

        Ok(IngestSummary {
            notes: added,
            failures: report.failures,
        })
    }

    #[instrument(skip(self, question), fields(subsystem = "api", component = "controller", op = "ask"))]
    async fn ask(&mut self, question: String) -> Result<ChatMessage> {
        let question = question.trim().to_string();
        if question.is_empty() {
            return Err(Error::InvalidInput("Question must not be empty".to_string()));
        }

        let user = ChatMessage::user(question.clone());
        let reply = match self
            .tutor
            .chat
            .answer(&question, &self.state.notes, &self.state.chat)
            .await
        {
            Ok(answer) => {
                self.events.emit(StudyEvent::ChatReplied {
                    citations: answer.sources.len(),
                    failed: false,
                });
                ChatMessage::assistant(answer.text, answer.sources)
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed, replying with apology");
                self.events.emit(StudyEvent::ChatReplied {
                    citations: 0,
                    failed: true,
                });
                ChatMessage::assistant(CHAT_APOLOGY, Vec::new())
            }
        };

        self.state.chat.push(user);
        self.state.chat.push(reply.clone());
        Ok(reply)
    }

    #[instrument(
        skip(self),
        fields(subsystem = "api", component = "controller", op = "start_quiz")
    )]
    async fn start_quiz(&mut self, config: QuizConfig) -> Result<QuizSnapshot> {
        if self.state.notes.is_empty() {
            return Err(Error::InvalidState(
                "Upload notes before starting a quiz".to_string(),
            ));
        }
        self.state.session.start(config)?;
        self.load_questions().await
    }

    #[instrument(skip(self), fields(subsystem = "api", component = "controller", op = "retry_quiz"))]
    async fn retry_quiz(&mut self) -> Result<QuizSnapshot> {
        self.state.session.retry()?;
        self.load_questions().await
    }

    /// Generate questions for a session that is loading.
    async fn load_questions(&mut self) -> Result<QuizSnapshot> {
        let config = self.state.session.config();
        let generated = self
            .tutor
            .quiz
            .generate(&self.state.notes, config.count, config.difficulty)
            .await;

        let questions = match generated {
            Ok(questions) => questions,
            Err(e) => {
                self.state.session.abort_loading();
                return Err(e);
            }
        };

        let total = self.state.session.loaded(questions)?;
        self.events.emit(StudyEvent::QuizStarted {
            questions: total,
            difficulty: config.difficulty.to_string(),
        });
        Ok(self.state.session.snapshot())
    }

    async fn proceed(&mut self) -> Result<QuizSnapshot> {
        match self.state.session.proceed()? {
            Advance::Next(index) => debug!(index, "Next question"),
            Advance::Finished(result) => {
                info!(score = result.score(), total = result.total(), "Quiz completed");
                self.state.history.push(result);
                self.events.emit(StudyEvent::QuizCompleted {
                    score: result.score(),
                    total: result.total(),
                });
                self.refresh_progress().await;
            }
        }
        Ok(self.state.session.snapshot())
    }

    /// Recompute the analysis from scratch. A failed call leaves it absent.
    #[instrument(
        skip(self),
        fields(
            subsystem = "api",
            component = "controller",
            op = "refresh_progress",
            notes = self.state.notes.len(),
            quizzes = self.state.history.len(),
        )
    )]
    async fn refresh_progress(&mut self) {
        if self.state.notes.is_empty() {
            self.state.progress = None;
            return;
        }

        match self
            .tutor
            .progress
            .analyze(&self.state.notes, &self.state.history)
            .await
        {
            Ok(analysis) => {
                self.events.emit(StudyEvent::ProgressUpdated {
                    overall_mastery: analysis.overall_mastery,
                    subjects: analysis.subjects.len(),
                });
                self.state.progress = Some(analysis);
            }
            Err(e) => {
                warn!(error = %e, "Progress analysis failed");
                self.state.progress = None;
            }
        }
    }

    fn progress_view(&self) -> ProgressView {
        if self.state.notes.is_empty() {
            return ProgressView::NoNotes;
        }
        if self.state.history.len() < PROGRESS_MIN_QUIZZES {
            return ProgressView::InsufficientData {
                completed_quizzes: self.state.history.len(),
                required_quizzes: PROGRESS_MIN_QUIZZES,
            };
        }
        match &self.state.progress {
            Some(analysis) => ProgressView::Ready {
                analysis: analysis.clone(),
                realized_mastery: realized_mastery(&self.state.history).unwrap_or(0),
                drill_topics: analysis.weak_topics(),
            },
            None => ProgressView::Unavailable,
        }
    }

    #[instrument(
        skip(self, topic),
        fields(
            subsystem = "api",
            component = "controller",
            op = "open_drill",
            topic = %topic.topic,
            subject = %topic.subject,
        )
    )]
    async fn open_drill(&mut self, topic: DrillTopic) -> Result<ActiveDrill> {
        let analysis = self
            .state
            .progress
            .as_ref()
            .ok_or_else(|| Error::InvalidState("No progress analysis available".to_string()))?;
        if !analysis.has_weakness(&topic.topic, &topic.subject) {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a weak topic of '{}'",
                topic.topic, topic.subject
            )));
        }

        self.state.drill = None;
        match self.tutor.drills.generate(&topic, &self.state.notes).await {
            Ok(drill) => {
                self.events.emit(StudyEvent::DrillReady {
                    topic: topic.topic.clone(),
                    subject: topic.subject.clone(),
                });
                let active = ActiveDrill { topic, drill };
                self.state.drill = Some(active.clone());
                Ok(active)
            }
            Err(e) => {
                error!(error = %e, "Drill generation failed");
                Err(e)
            }
        }
    }
}

/// Cloneable sender side of the controller queue.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Command>,
}

impl ControllerHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| Error::Internal("Controller is not running".to_string()))?;
        rx.await
            .map_err(|_| Error::Internal("Controller dropped the request".to_string()))?
    }

    pub async fn add_files(&self, files: Vec<UploadedFile>) -> Result<IngestSummary> {
        self.request(|reply| Command::AddFiles { files, reply }).await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.request(|reply| Command::ListNotes { reply }).await
    }

    pub async fn ask(&self, question: impl Into<String>) -> Result<ChatMessage> {
        let question = question.into();
        self.request(|reply| Command::Ask { question, reply }).await
    }

    pub async fn chat(&self) -> Result<Vec<ChatMessage>> {
        self.request(|reply| Command::GetChat { reply }).await
    }

    pub async fn start_quiz(&self, config: QuizConfig) -> Result<QuizSnapshot> {
        self.request(|reply| Command::StartQuiz { config, reply }).await
    }

    pub async fn select_answer(&self, option: usize) -> Result<Selection> {
        self.request(|reply| Command::SelectAnswer { option, reply })
            .await
    }

    pub async fn proceed(&self) -> Result<QuizSnapshot> {
        self.request(|reply| Command::Proceed { reply }).await
    }

    pub async fn retry_quiz(&self) -> Result<QuizSnapshot> {
        self.request(|reply| Command::Retry { reply }).await
    }

    pub async fn reset_quiz(&self) -> Result<QuizSnapshot> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn quiz(&self) -> Result<QuizSnapshot> {
        self.request(|reply| Command::GetQuiz { reply }).await
    }

    pub async fn progress(&self) -> Result<ProgressView> {
        self.request(|reply| Command::GetProgress { reply }).await
    }

    pub async fn open_drill(&self, topic: DrillTopic) -> Result<ActiveDrill> {
        self.request(|reply| Command::OpenDrill { topic, reply }).await
    }

    pub async fn drill(&self) -> Result<Option<ActiveDrill>> {
        self.request(|reply| Command::GetDrill { reply }).await
    }

    pub async fn close_drill(&self) -> Result<()> {
        self.request(|reply| Command::CloseDrill { reply }).await
    }
}
