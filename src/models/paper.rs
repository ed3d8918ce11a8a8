//! Paper entity and its status lifecycle.

use crate::errors::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a submitted paper.
///
/// Transitions are monotonic forward (`SUBMITTED → UNDER_REVIEW →
/// {ACCEPTED | REJECTED}`) except the author-initiated side transition to
/// `WITHDRAWN`, which is blocked once a decision has been made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaperStatus {
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl PaperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperStatus::Submitted => "SUBMITTED",
            PaperStatus::UnderReview => "UNDER_REVIEW",
            PaperStatus::Accepted => "ACCEPTED",
            PaperStatus::Rejected => "REJECTED",
            PaperStatus::Withdrawn => "WITHDRAWN",
        }
    }

    /// ACCEPTED and REJECTED are terminal for decision purposes.
    pub fn is_final(&self) -> bool {
        matches!(self, PaperStatus::Accepted | PaperStatus::Rejected)
    }
}

/// A binding accept/reject decision.
///
/// Closed variant so that "decision from string" at the boundary is an
/// explicit parse-and-validate step, never a cast of an arbitrary status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "ACCEPTED",
            Decision::Rejected => "REJECTED",
        }
    }

    /// The paper status this decision resolves to.
    pub fn as_status(&self) -> PaperStatus {
        match self {
            Decision::Accepted => PaperStatus::Accepted,
            Decision::Rejected => PaperStatus::Rejected,
        }
    }

    /// Validate a requested paper status as a decision target.
    pub fn try_from_status(status: PaperStatus) -> Result<Self, EngineError> {
        match status {
            PaperStatus::Accepted => Ok(Decision::Accepted),
            PaperStatus::Rejected => Ok(Decision::Rejected),
            other => Err(EngineError::InvalidDecision {
                status: other.as_str().to_owned(),
            }),
        }
    }
}

impl FromStr for Decision {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACCEPTED" => Ok(Decision::Accepted),
            "REJECTED" => Ok(Decision::Rejected),
            other => Err(EngineError::InvalidDecision {
                status: other.to_owned(),
            }),
        }
    }
}

/// A submitted paper.
///
/// Created by the submission flow (outside this engine); mutated here only
/// through status transitions. Papers are never deleted, only status-flagged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: Uuid,
    pub title: String,
    pub abstract_text: String,
    /// Reference to the uploaded manuscript, owned by the file-storage collaborator.
    pub file_ref: Option<String>,
    pub status: PaperStatus,
    pub track_id: Option<Uuid>,
    pub main_author_id: Uuid,
    pub co_author_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Paper {
    /// A freshly submitted paper.
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>, main_author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            file_ref: None,
            status: PaperStatus::Submitted,
            track_id: None,
            main_author_id,
            co_author_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
