//! Activity-log seam: one record per state-changing operation.

use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure { reason: String },
}

impl AuditOutcome {
    /// Derive the outcome from an operation result.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => AuditOutcome::Success,
            Err(err) => AuditOutcome::Failure {
                reason: err.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditRecord {
    /// The acting party, when the operation names one (e.g. the declaring
    /// reviewer). Chair/admin identity is attached by the boundary layer.
    pub actor_id: Option<Uuid>,
    pub action: &'static str,
    pub target: String,
    pub outcome: AuditOutcome,
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        actor_id: Option<Uuid>,
        action: &'static str,
        target: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            actor_id,
            action,
            target: target.into(),
            outcome,
            at: Utc::now(),
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Audit sink backed by the tracing pipeline. Failed business outcomes are
/// expected and logged at info level, not as system failures.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        match &record.outcome {
            AuditOutcome::Success => {
                tracing::info!(
                    actor = ?record.actor_id,
                    action = record.action,
                    target = %record.target,
                    outcome = "success",
                    "audit"
                );
            }
            AuditOutcome::Failure { reason } => {
                tracing::info!(
                    actor = ?record.actor_id,
                    action = record.action,
                    target = %record.target,
                    outcome = "failure",
                    reason = %reason,
                    "audit"
                );
            }
        }
    }
}

/// Audit sink that collects records in memory, for tests.
#[derive(Default)]
pub struct RecordingAuditSink {
    records: std::sync::Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit lock poisoned").clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, record: AuditRecord) {
        self.records.lock().expect("audit lock poisoned").push(record);
    }
}
