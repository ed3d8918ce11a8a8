//! Declared conflict-of-interest records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conflict between a reviewer and a paper, either self-declared by the
/// reviewer or recorded by a chair. Never updated; an administrator may
/// delete it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictOfInterest {
    pub id: Uuid,
    pub paper_id: Uuid,
    pub reviewer_id: Uuid,
    /// Free-text reason, e.g. "former PhD advisor".
    pub reason: String,
    pub declared_at: DateTime<Utc>,
}

impl ConflictOfInterest {
    pub fn new(paper_id: Uuid, reviewer_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            paper_id,
            reviewer_id,
            reason: reason.into(),
            declared_at: Utc::now(),
        }
    }
}
