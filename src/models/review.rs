//! Review entity and the author-facing reduced view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive score range, following the peer-review convention where
/// negative scores lean reject and positive lean accept.
pub const MIN_SCORE: i32 = -3;
pub const MAX_SCORE: i32 = 3;

pub fn score_in_range(score: i32) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// A reviewer's verdict, attached 1:1 to an assignment.
///
/// Write-once: there is no amendment path. Correction would be a new domain
/// action, not a mutation of this record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub score: i32,
    pub confidence_level: i32,
    pub comment_for_author: String,
    /// PC-internal comment. Must never reach an author-facing response.
    pub comment_for_pc: String,
    pub submitted_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        assignment_id: Uuid,
        score: i32,
        confidence_level: i32,
        comment_for_author: impl Into<String>,
        comment_for_pc: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            assignment_id,
            score,
            confidence_level,
            comment_for_author: comment_for_author.into(),
            comment_for_pc: comment_for_pc.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Author-facing view of a review.
///
/// Structurally cannot carry the PC-internal comment, so the suppression
/// invariant holds regardless of how the boundary layer serializes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorReviewView {
    pub id: Uuid,
    pub score: i32,
    pub confidence_level: i32,
    pub comment_for_author: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Review> for AuthorReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            score: review.score,
            confidence_level: review.confidence_level,
            comment_for_author: review.comment_for_author.clone(),
            submitted_at: review.submitted_at,
        }
    }
}
