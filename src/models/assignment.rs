//! Reviewer assignment entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a reviewer assignment.
///
/// `PENDING → {ACCEPTED | DECLINED}` through reviewer response;
/// `{PENDING, ACCEPTED} → COMPLETED` once a review is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl AssignmentStatus {
    /// COMPLETED and DECLINED admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Declined)
    }

    /// Whether a review may still be submitted against this assignment.
    pub fn accepts_review(&self) -> bool {
        matches!(self, AssignmentStatus::Pending | AssignmentStatus::Accepted)
    }
}

/// Links a paper to a reviewer. At most one assignment exists per
/// (paper, reviewer) pair; the associated review, if any, is reachable
/// through the store by assignment id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewerAssignment {
    pub id: Uuid,
    pub paper_id: Uuid,
    pub reviewer_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl ReviewerAssignment {
    pub fn new(paper_id: Uuid, reviewer_id: Uuid, due_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            paper_id,
            reviewer_id,
            status: AssignmentStatus::Pending,
            assigned_at: Utc::now(),
            due_at,
        }
    }
}
