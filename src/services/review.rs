//! Review submission engine: records a reviewer's verdict against an
//! assignment exactly once.

use crate::audit::{AuditOutcome, AuditRecord, AuditSink};
use crate::errors::{EngineError, Result};
use crate::events::{dispatch_best_effort, NotificationDispatcher, NotificationEvent};
use crate::models::review::score_in_range;
use crate::models::{AssignmentStatus, AuthorReviewView, Review};
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

pub struct ReviewService {
    store: Arc<dyn Store>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: Arc<dyn AuditSink>,
}

impl ReviewService {
    pub fn new(
        store: Arc<dyn Store>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            audit,
        }
    }

    /// Record a review against an assignment and complete it.
    ///
    /// Reviews are write-once: a COMPLETED assignment rejects any further
    /// submission and the original review is preserved. The store-level
    /// attach is atomic, so of two concurrent submissions exactly one wins.
    pub async fn submit_review(
        &self,
        assignment_id: Uuid,
        score: i32,
        confidence_level: i32,
        comment_for_author: impl Into<String>,
        comment_for_pc: impl Into<String>,
    ) -> Result<Review> {
        let result = self
            .do_submit(
                assignment_id,
                score,
                confidence_level,
                comment_for_author.into(),
                comment_for_pc.into(),
            )
            .await;
        self.audit.record(AuditRecord::new(
            None,
            "submit_review",
            format!("assignment:{assignment_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    async fn do_submit(
        &self,
        assignment_id: Uuid,
        score: i32,
        confidence_level: i32,
        comment_for_author: String,
        comment_for_pc: String,
    ) -> Result<Review> {
        let assignment = self
            .store
            .find_assignment(assignment_id)
            .await?
            .ok_or(EngineError::AssignmentNotFound { id: assignment_id })?;

        match assignment.status {
            AssignmentStatus::Completed => {
                return Err(EngineError::AlreadyCompleted { assignment_id });
            }
            AssignmentStatus::Declined => {
                return Err(EngineError::InvalidAssignmentState {
                    assignment_id,
                    status: assignment.status,
                });
            }
            AssignmentStatus::Pending | AssignmentStatus::Accepted => {}
        }

        if !score_in_range(score) {
            return Err(EngineError::InvalidScore { score });
        }

        let review = self
            .store
            .attach_review(Review::new(
                assignment_id,
                score,
                confidence_level,
                comment_for_author,
                comment_for_pc,
            ))
            .await?;

        dispatch_best_effort(
            self.dispatcher.as_ref(),
            NotificationEvent::ReviewSubmitted {
                paper_id: assignment.paper_id,
                assignment_id,
                reviewer_id: assignment.reviewer_id,
            },
        )
        .await;

        metrics::counter!("peerflow_reviews_submitted_total").increment(1);
        tracing::info!(
            assignment_id = %assignment_id,
            paper_id = %assignment.paper_id,
            score,
            "review submitted"
        );

        Ok(review)
    }

    /// Full review detail for a paper, chair-facing.
    pub async fn reviews_for_paper(&self, paper_id: Uuid) -> Result<Vec<Review>> {
        self.store.reviews_for_paper(paper_id).await
    }

    /// Author-facing view: the PC-internal comment never appears here.
    pub async fn reviews_for_author(&self, paper_id: Uuid) -> Result<Vec<AuthorReviewView>> {
        let reviews = self.store.reviews_for_paper(paper_id).await?;
        Ok(reviews.iter().map(AuthorReviewView::from).collect())
    }

    /// The review for a single assignment, if one has been submitted.
    pub async fn review_for_assignment(&self, assignment_id: Uuid) -> Result<Option<Review>> {
        self.store.review_for_assignment(assignment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewerAssignment, MAX_SCORE, MIN_SCORE};
    use crate::services::testing::{harness, Harness};

    async fn assigned() -> (Harness, ReviewerAssignment) {
        let h = harness();
        let author = h.seed_user("Ada Lovelace", None).await;
        let paper = h.seed_paper("On Computable Numbers", &author).await;
        let reviewer = h.seed_user("Alan Turing", None).await;
        let assignment = h
            .state
            .assignments
            .assign_reviewer(paper.id, reviewer.id)
            .await
            .unwrap();
        (h, assignment)
    }

    #[tokio::test]
    async fn every_score_in_range_is_accepted_and_outliers_rejected() {
        for score in MIN_SCORE..=MAX_SCORE {
            let (h, assignment) = assigned().await;
            h.state
                .reviews
                .submit_review(assignment.id, score, 3, "ok", "")
                .await
                .unwrap_or_else(|err| panic!("score {score} should be valid: {err}"));
        }

        let (h, assignment) = assigned().await;
        for score in [MIN_SCORE - 1, MAX_SCORE + 1] {
            let err = h
                .state
                .reviews
                .submit_review(assignment.id, score, 3, "ok", "")
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidScore { .. }));
        }
    }

    #[tokio::test]
    async fn completion_is_terminal() {
        let (h, assignment) = assigned().await;
        h.state
            .reviews
            .submit_review(assignment.id, 1, 4, "fine", "lean accept")
            .await
            .unwrap();

        let err = h
            .state
            .reviews
            .submit_review(assignment.id, -3, 1, "changed my mind", "")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyCompleted { .. }));

        // the original review is preserved
        let kept = h
            .state
            .reviews
            .review_for_assignment(assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.score, 1);
    }

    #[tokio::test]
    async fn submission_completes_pending_and_accepted_assignments() {
        let (h, assignment) = assigned().await;
        assert_eq!(assignment.status, AssignmentStatus::Pending);
        h.state
            .reviews
            .submit_review(assignment.id, 2, 4, "good", "")
            .await
            .unwrap();
        let completed = h
            .state
            .assignments
            .get_assignment(assignment.id)
            .await
            .unwrap();
        assert_eq!(completed.status, AssignmentStatus::Completed);

        let (h, assignment) = assigned().await;
        h.state
            .assignments
            .accept_assignment(assignment.id)
            .await
            .unwrap();
        h.state
            .reviews
            .submit_review(assignment.id, 0, 3, "borderline", "")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn declined_assignments_take_no_review() {
        let (h, assignment) = assigned().await;
        h.state
            .assignments
            .decline_assignment(assignment.id)
            .await
            .unwrap();

        let err = h
            .state
            .reviews
            .submit_review(assignment.id, 2, 4, "ok", "")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAssignmentState { .. }));
    }

    #[tokio::test]
    async fn unknown_assignment_is_not_found() {
        let (h, _) = assigned().await;
        let err = h
            .state
            .reviews
            .submit_review(Uuid::new_v4(), 2, 4, "ok", "")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AssignmentNotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_submissions_yield_exactly_one_review() {
        let (h, assignment) = assigned().await;
        let service = &h.state.reviews;
        let (first, second) = tokio::join!(
            service.submit_review(assignment.id, 2, 4, "first", ""),
            service.submit_review(assignment.id, -2, 2, "second", ""),
        );
        assert_eq!(
            first.is_ok() as u8 + second.is_ok() as u8,
            1,
            "exactly one submission must win"
        );

        let reviews = h
            .state
            .reviews
            .reviews_for_paper(assignment.paper_id)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 1);
    }

    #[tokio::test]
    async fn author_view_suppresses_the_pc_comment() {
        let (h, assignment) = assigned().await;
        h.state
            .reviews
            .submit_review(assignment.id, 2, 4, "well written", "weak related work")
            .await
            .unwrap();

        let chair_view = h
            .state
            .reviews
            .reviews_for_paper(assignment.paper_id)
            .await
            .unwrap();
        assert_eq!(chair_view[0].comment_for_pc, "weak related work");

        let author_view = h
            .state
            .reviews
            .reviews_for_author(assignment.paper_id)
            .await
            .unwrap();
        assert_eq!(author_view.len(), 1);
        assert_eq!(author_view[0].comment_for_author, "well written");
        let json = serde_json::to_string(&author_view).unwrap();
        assert!(!json.contains("weak related work"));
    }

    #[tokio::test]
    async fn submission_notifies_the_chair() {
        let (h, assignment) = assigned().await;
        h.state
            .reviews
            .submit_review(assignment.id, 2, 4, "ok", "")
            .await
            .unwrap();

        let events = h.dispatcher.events();
        // assignment_created from setup, then review_submitted
        assert_eq!(events.last().unwrap().kind(), "review_submitted");
    }
}
