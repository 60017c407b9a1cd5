//! HTTP routes over the controller.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, Method, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use studymate_core::defaults::{CORS_MAX_AGE_SECS, SSE_KEEPALIVE_SECS};
use studymate_core::{DrillTopic, EventBus, UploadedFile};

use crate::config::ServerConfig;
use crate::controller::ControllerHandle;
use crate::error::ApiError;
use crate::quiz_session::QuizConfig;

#[derive(Clone)]
pub struct AppContext {
    pub controller: ControllerHandle,
    pub events: EventBus,
}

/// Build the full router.
///
/// `events` must be the bus the controller emits on.
pub fn router(controller: ControllerHandle, events: EventBus, config: &ServerConfig) -> Router {
    let state = AppContext { controller, events };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/events", get(sse_events))
        .route("/api/v1/notes", post(upload_notes).get(list_notes))
        .route("/api/v1/chat", post(ask).get(get_chat))
        .route("/api/v1/quiz", get(get_quiz))
        .route("/api/v1/quiz/start", post(start_quiz))
        .route("/api/v1/quiz/answer", post(select_answer))
        .route("/api/v1/quiz/next", post(next_question))
        .route("/api/v1/quiz/retry", post(retry_quiz))
        .route("/api/v1/quiz/reset", post(reset_quiz))
        .route("/api/v1/progress", get(get_progress))
        .route(
            "/api/v1/lessons/drill",
            post(open_drill).get(get_drill).delete(close_drill),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(CORS_MAX_AGE_SECS)),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Server-Sent Events stream of every committed state change.
///
/// Each event is named after its envelope type (`note.added`,
/// `quiz.completed`, ...) and carries the envelope as JSON.
async fn sse_events(
    State(state): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(envelope) => match serde_json::to_string(&envelope) {
            Ok(json) => Some(Ok::<_, Infallible>(
                Event::default().event(envelope.event_type).data(json),
            )),
            Err(_) => None,
        },
        // Lagged receivers skip what they missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEPALIVE_SECS))
            .text("keepalive"),
    )
}

// =============================================================================
// NOTES
// =============================================================================

/// Accepts every multipart field that carries a file name.
async fn upload_notes(
    State(state): State<AppContext>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?;
        files.push(UploadedFile::new(name, content_type, data.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest(
            "No files uploaded. Send one or more multipart file fields.".to_string(),
        ));
    }

    let summary = state.controller.add_files(files).await?;
    let status = if summary.notes.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(summary)))
}

async fn list_notes(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.list_notes().await?))
}

// =============================================================================
// CHAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct AskBody {
    question: String,
}

async fn ask(
    State(state): State<AppContext>,
    Json(body): Json<AskBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.ask(body.question).await?))
}

async fn get_chat(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.chat().await?))
}

// =============================================================================
// QUIZ
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnswerBody {
    option: usize,
}

async fn get_quiz(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.quiz().await?))
}

async fn start_quiz(
    State(state): State<AppContext>,
    Json(config): Json<QuizConfig>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.start_quiz(config).await?))
}

async fn select_answer(
    State(state): State<AppContext>,
    Json(body): Json<AnswerBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.select_answer(body.option).await?))
}

async fn next_question(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.proceed().await?))
}

async fn retry_quiz(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.retry_quiz().await?))
}

async fn reset_quiz(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.reset_quiz().await?))
}

// =============================================================================
// PROGRESS & LESSONS
// =============================================================================

async fn get_progress(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.progress().await?))
}

async fn open_drill(
    State(state): State<AppContext>,
    Json(topic): Json<DrillTopic>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.controller.open_drill(topic).await?))
}

async fn get_drill(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    match state.controller.drill().await? {
        Some(drill) => Ok(Json(drill)),
        None => Err(ApiError::NotFound("No lesson drill is open".to_string())),
    }
}

async fn close_drill(State(state): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    state.controller.close_drill().await?;
    Ok(StatusCode::NO_CONTENT)
}
