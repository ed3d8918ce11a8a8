//! Typed notification events and the dispatcher seam.
//!
//! Delivery (email templates, retries) belongs entirely to the dispatcher
//! implementation. From the engine's perspective dispatch is fire-and-forget:
//! a failed dispatch is logged and never rolls back the committed state
//! transition that produced the event.

use crate::models::paper::Decision;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One event per successful state-changing operation with external visibility.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    AssignmentCreated {
        paper_id: Uuid,
        reviewer_id: Uuid,
        due_at: DateTime<Utc>,
    },
    ReviewSubmitted {
        paper_id: Uuid,
        assignment_id: Uuid,
        reviewer_id: Uuid,
    },
    DecisionMade {
        paper_id: Uuid,
        author_id: Uuid,
        decision: Decision,
        comment: Option<String>,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::AssignmentCreated { .. } => "assignment_created",
            NotificationEvent::ReviewSubmitted { .. } => "review_submitted",
            NotificationEvent::DecisionMade { .. } => "decision_made",
        }
    }
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: NotificationEvent) -> anyhow::Result<()>;
}

/// Dispatch without letting a delivery failure surface to the caller.
pub(crate) async fn dispatch_best_effort(
    dispatcher: &dyn NotificationDispatcher,
    event: NotificationEvent,
) {
    let kind = event.kind();
    if let Err(err) = dispatcher.dispatch(event).await {
        tracing::warn!(error = %err, event = kind, "notification dispatch failed");
    }
}

/// Dispatcher that drops every event. Useful when the engine runs without a
/// delivery backend, e.g. in batch tooling.
pub struct NullDispatcher;

#[async_trait]
impl NotificationDispatcher for NullDispatcher {
    async fn dispatch(&self, _event: NotificationEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Dispatcher that records events in memory, for tests asserting on the
/// notification contract.
#[derive(Default)]
pub struct RecordingDispatcher {
    events: std::sync::Mutex<Vec<NotificationEvent>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("dispatcher lock poisoned").clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, event: NotificationEvent) -> anyhow::Result<()> {
        self.events.lock().expect("dispatcher lock poisoned").push(event);
        Ok(())
    }
}
