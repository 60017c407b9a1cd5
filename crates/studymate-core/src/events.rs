//! Study events, envelope schema, and event bus for state-change notifications.
//!
//! The controller emits one [`StudyEvent`] per committed state change.
//! Consumers (log sinks, future push channels) subscribe independently.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

// ============================================================================
// Event Envelope
// ============================================================================

/// Versioned wrapper around a [`StudyEvent`].
///
/// `event_type` uses dot-namespaced names (e.g. `"note.added"`,
/// `"quiz.completed"`).
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type.
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// ID of the entity this event relates to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Payload schema version.
    pub payload_version: u32,
    /// Domain-specific event data.
    pub payload: StudyEvent,
}

impl EventEnvelope {
    pub fn new(event: StudyEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            entity_id: event.entity_id().map(|id| id.to_string()),
            payload_version: 1,
            payload: event,
        }
    }
}

// ============================================================================
// Study Event (domain payloads)
// ============================================================================

/// State changes committed by the controller.
///
/// Serialized as JSON with a `type` tag, e.g.
/// `{"type":"QuizCompleted","score":15,"total":18}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StudyEvent {
    /// A note was ingested and summarized.
    NoteAdded { note_id: Uuid, name: String },
    /// The tutor answered a chat question.
    ChatReplied { citations: usize, failed: bool },
    /// Quiz generation finished and the session is active.
    QuizStarted {
        questions: usize,
        difficulty: String,
    },
    /// A quiz session completed and its result was recorded.
    QuizCompleted { score: u32, total: u32 },
    /// Progress analysis was recomputed.
    ProgressUpdated { overall_mastery: f64, subjects: usize },
    /// A lesson drill was generated.
    DrillReady { topic: String, subject: String },
}

impl StudyEvent {
    /// Namespaced event type for the envelope (e.g. `"note.added"`).
    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            StudyEvent::NoteAdded { .. } => "note.added",
            StudyEvent::ChatReplied { .. } => "chat.replied",
            StudyEvent::QuizStarted { .. } => "quiz.started",
            StudyEvent::QuizCompleted { .. } => "quiz.completed",
            StudyEvent::ProgressUpdated { .. } => "progress.updated",
            StudyEvent::DrillReady { .. } => "drill.ready",
        }
    }

    /// Primary entity ID this event relates to.
    pub fn entity_id(&self) -> Option<Uuid> {
        match self {
            StudyEvent::NoteAdded { note_id, .. } => Some(*note_id),
            _ => None,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus for distributing study events.
///
/// Slow receivers that fall behind get a `Lagged` error and miss events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently with no subscribers.
    pub fn emit(&self, event: StudyEvent) {
        let envelope = EventEnvelope::new(event);
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_subscribe() {
        let bus = EventBus::new(32);
        let mut rx = bus.subscribe();

        bus.emit(StudyEvent::QuizCompleted {
            score: 15,
            total: 18,
        });

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event_type, "quiz.completed");
        assert_eq!(envelope.payload_version, 1);
        assert!(envelope.entity_id.is_none());
        assert_eq!(
            envelope.payload,
            StudyEvent::QuizCompleted {
                score: 15,
                total: 18
            }
        );
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(32);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let note_id = Uuid::now_v7();
        bus.emit(StudyEvent::NoteAdded {
            note_id,
            name: "cells.txt".to_string(),
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.event_id, e2.event_id);
        assert_eq!(e1.entity_id, Some(note_id.to_string()));
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::new(4);
        bus.emit(StudyEvent::DrillReady {
            topic: "Genetics".to_string(),
            subject: "Biology".to_string(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(StudyEvent::ChatReplied {
            citations: 2,
            failed: false,
        })
        .unwrap();
        assert_eq!(json["type"], "ChatReplied");
        assert_eq!(json["citations"], 2);
    }
}
