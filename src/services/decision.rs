//! Decision engine: aggregates review scores and applies binding
//! accept/reject decisions, singly or best-effort across a batch.

use crate::audit::{AuditOutcome, AuditRecord, AuditSink};
use crate::errors::{EngineError, Result};
use crate::events::{dispatch_best_effort, NotificationDispatcher, NotificationEvent};
use crate::models::{Decision, Paper, PaperStatus, Review};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Summary of a bulk decision run. Never all-or-nothing: failures are
/// recorded per item, in input order, and later items still run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BulkDecisionOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Read-only aggregate over a paper's reviews. Zeroed fields, not an error,
/// when no reviews exist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewStatistics {
    pub total_reviews: usize,
    pub average_score: f64,
    pub min_score: i32,
    pub max_score: i32,
    pub reviews: Vec<Review>,
}

/// Author-facing decision lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionView {
    pub paper_id: Uuid,
    pub status: PaperStatus,
    pub decided_at: DateTime<Utc>,
}

pub struct DecisionService {
    store: Arc<dyn Store>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: Arc<dyn AuditSink>,
}

impl DecisionService {
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

    /// Arithmetic mean of the paper's review scores, rounded half-up to two
    /// decimals. "No reviews yet" is a valid steady state and yields 0.0.
    pub async fn average_score(&self, paper_id: Uuid) -> Result<f64> {
        let reviews = self.store.reviews_for_paper(paper_id).await?;
        if reviews.is_empty() {
            return Ok(0.0);
        }
        let sum: i64 = reviews.iter().map(|r| i64::from(r.score)).sum();
        Ok(round2(sum as f64 / reviews.len() as f64))
    }

    /// Apply a binding accept/reject decision.
    ///
    /// Re-deciding an already-decided paper is allowed: the status is
    /// re-applied and the notification fires again.
    pub async fn make_decision(
        &self,
        paper_id: Uuid,
        status: PaperStatus,
        comment: Option<String>,
    ) -> Result<Paper> {
        let result = self.do_decide(paper_id, status, comment).await;
        self.audit.record(AuditRecord::new(
            None,
            "make_decision",
            format!("paper:{paper_id} status:{}", status.as_str()),
            AuditOutcome::of(&result),
        ));
        result
    }

    async fn do_decide(
        &self,
        paper_id: Uuid,
        status: PaperStatus,
        comment: Option<String>,
    ) -> Result<Paper> {
        self.store
            .find_paper(paper_id)
            .await?
            .ok_or(EngineError::PaperNotFound { id: paper_id })?;
        let decision = Decision::try_from_status(status)?;

        let paper = self
            .store
            .update_paper_status(paper_id, decision.as_status())
            .await?;

        dispatch_best_effort(
            self.dispatcher.as_ref(),
            NotificationEvent::DecisionMade {
                paper_id,
                author_id: paper.main_author_id,
                decision,
                comment,
            },
        )
        .await;

        metrics::counter!("peerflow_decisions_total", "decision" => decision.as_str())
            .increment(1);
        tracing::info!(
            paper_id = %paper_id,
            decision = decision.as_str(),
            "decision made"
        );

        Ok(paper)
    }

    /// Apply `make_decision` independently to each id, in order. A failure
    /// on one paper is recorded and does not abort the rest of the batch.
    pub async fn bulk_make_decision(
        &self,
        paper_ids: &[Uuid],
        status: PaperStatus,
        comment: Option<String>,
    ) -> BulkDecisionOutcome {
        let mut outcome = BulkDecisionOutcome {
            total: paper_ids.len(),
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
        };

        for &paper_id in paper_ids {
            match self.make_decision(paper_id, status, comment.clone()).await {
                Ok(_) => outcome.succeeded += 1,
                Err(err) => {
                    outcome.failed += 1;
                    outcome.errors.push(format!("paper {paper_id}: {err}"));
                }
            }
        }

        tracing::info!(
            total = outcome.total,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "bulk decision finished"
        );
        outcome
    }

    /// Count, average, min, and max over a paper's reviews plus the raw
    /// review list; zeroed when none exist.
    pub async fn review_statistics(&self, paper_id: Uuid) -> Result<ReviewStatistics> {
        let reviews = self.store.reviews_for_paper(paper_id).await?;
        if reviews.is_empty() {
            return Ok(ReviewStatistics {
                total_reviews: 0,
                average_score: 0.0,
                min_score: 0,
                max_score: 0,
                reviews,
            });
        }

        let sum: i64 = reviews.iter().map(|r| i64::from(r.score)).sum();
        let min_score = reviews.iter().map(|r| r.score).min().unwrap_or(0);
        let max_score = reviews.iter().map(|r| r.score).max().unwrap_or(0);

        Ok(ReviewStatistics {
            total_reviews: reviews.len(),
            average_score: round2(sum as f64 / reviews.len() as f64),
            min_score,
            max_score,
            reviews,
        })
    }

    /// The decision state of a paper as the author sees it.
    pub async fn decision_for_paper(&self, paper_id: Uuid) -> Result<DecisionView> {
        let paper = self
            .store
            .find_paper(paper_id)
            .await?
            .ok_or(EngineError::PaperNotFound { id: paper_id })?;
        Ok(DecisionView {
            paper_id,
            status: paper.status,
            decided_at: paper.updated_at,
        })
    }

    /// Author-initiated withdrawal. Blocked once the paper is decided.
    pub async fn withdraw_paper(&self, paper_id: Uuid, requested_by: Uuid) -> Result<Paper> {
        let result = self.do_withdraw(paper_id, requested_by).await;
        self.audit.record(AuditRecord::new(
            Some(requested_by),
            "withdraw_paper",
            format!("paper:{paper_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    async fn do_withdraw(&self, paper_id: Uuid, requested_by: Uuid) -> Result<Paper> {
        let paper = self
            .store
            .find_paper(paper_id)
            .await?
            .ok_or(EngineError::PaperNotFound { id: paper_id })?;

        if paper.main_author_id != requested_by {
            return Err(EngineError::Forbidden {
                message: "only the main author may withdraw a paper".to_owned(),
            });
        }
        if paper.status.is_final() {
            return Err(EngineError::PaperFinalized {
                id: paper_id,
                status: paper.status,
            });
        }

        let paper = self
            .store
            .update_paper_status(paper_id, PaperStatus::Withdrawn)
            .await?;
        tracing::info!(paper_id = %paper_id, "paper withdrawn");
        Ok(paper)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::services::testing::{harness, Harness};

    async fn submit_scores(h: &Harness, paper_id: Uuid, scores: &[i32]) {
        for &score in scores {
            let reviewer = h.seed_user(&format!("reviewer-{score}-{}", Uuid::new_v4()), None).await;
            let assignment = h
                .state
                .assignments
                .assign_reviewer(paper_id, reviewer.id)
                .await
                .unwrap();
            h.state
                .reviews
                .submit_review(assignment.id, score, 3, "comment", "")
                .await
                .unwrap();
        }
    }

    async fn seeded() -> (Harness, crate::models::Paper, UserProfile) {
        let h = harness();
        let author = h.seed_user("Ada Lovelace", None).await;
        let paper = h.seed_paper("On Computable Numbers", &author).await;
        (h, paper, author)
    }

    #[tokio::test]
    async fn average_is_zero_without_reviews() {
        let (h, paper, _) = seeded().await;
        assert_eq!(h.state.decisions.average_score(paper.id).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn average_rounds_to_two_decimals() {
        let (h, paper, _) = seeded().await;
        submit_scores(&h, paper.id, &[2, 0]).await;
        assert_eq!(h.state.decisions.average_score(paper.id).await.unwrap(), 1.0);

        let (h, paper, _) = seeded().await;
        submit_scores(&h, paper.id, &[3, 3, -3]).await;
        assert_eq!(h.state.decisions.average_score(paper.id).await.unwrap(), 1.0);

        let (h, paper, _) = seeded().await;
        submit_scores(&h, paper.id, &[1, 0, 0]).await;
        assert_eq!(h.state.decisions.average_score(paper.id).await.unwrap(), 0.33);
    }

    #[tokio::test]
    async fn only_accept_and_reject_are_valid_decisions() {
        let (h, paper, _) = seeded().await;
        for status in [
            PaperStatus::Submitted,
            PaperStatus::UnderReview,
            PaperStatus::Withdrawn,
        ] {
            let err = h
                .state
                .decisions
                .make_decision(paper.id, status, None)
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidDecision { .. }));
        }

        let decided = h
            .state
            .decisions
            .make_decision(paper.id, PaperStatus::Accepted, Some("ok".into()))
            .await
            .unwrap();
        assert_eq!(decided.status, PaperStatus::Accepted);

        let re_decided = h
            .state
            .decisions
            .make_decision(paper.id, PaperStatus::Rejected, None)
            .await
            .unwrap();
        assert_eq!(re_decided.status, PaperStatus::Rejected);
    }

    #[tokio::test]
    async fn deciding_an_unknown_paper_is_not_found() {
        let (h, _, _) = seeded().await;
        let err = h
            .state
            .decisions
            .make_decision(Uuid::new_v4(), PaperStatus::Accepted, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PaperNotFound { .. }));
    }

    #[tokio::test]
    async fn re_deciding_fires_the_notification_again() {
        let (h, paper, author) = seeded().await;
        h.state
            .decisions
            .make_decision(paper.id, PaperStatus::Accepted, None)
            .await
            .unwrap();
        h.state
            .decisions
            .make_decision(paper.id, PaperStatus::Accepted, None)
            .await
            .unwrap();

        let decisions: Vec<_> = h
            .dispatcher
            .events()
            .into_iter()
            .filter(|e| e.kind() == "decision_made")
            .collect();
        assert_eq!(decisions.len(), 2);
        match &decisions[0] {
            NotificationEvent::DecisionMade {
                author_id, decision, ..
            } => {
                assert_eq!(*author_id, author.id);
                assert_eq!(*decision, Decision::Accepted);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn bulk_decision_isolates_failures() {
        let (h, paper, _) = seeded().await;
        let missing = Uuid::new_v4();

        let outcome = h
            .state
            .decisions
            .bulk_make_decision(&[paper.id, missing], PaperStatus::Accepted, Some("ok".into()))
            .await;

        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains(&missing.to_string()));

        let decided = h.store.find_paper(paper.id).await.unwrap().unwrap();
        assert_eq!(decided.status, PaperStatus::Accepted);
    }

    #[tokio::test]
    async fn bulk_decision_continues_past_early_failures() {
        let (h, first, _) = seeded().await;
        let author = h.seed_user("Grace Hopper", None).await;
        let second = h.seed_paper("Compilers", &author).await;

        let outcome = h
            .state
            .decisions
            .bulk_make_decision(
                &[Uuid::new_v4(), first.id, second.id],
                PaperStatus::Rejected,
                None,
            )
            .await;

        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        for id in [first.id, second.id] {
            let paper = h.store.find_paper(id).await.unwrap().unwrap();
            assert_eq!(paper.status, PaperStatus::Rejected);
        }
    }

    #[tokio::test]
    async fn statistics_are_zeroed_without_reviews() {
        let (h, paper, _) = seeded().await;
        let stats = h.state.decisions.review_statistics(paper.id).await.unwrap();
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.min_score, 0);
        assert_eq!(stats.max_score, 0);
        assert!(stats.reviews.is_empty());
    }

    #[tokio::test]
    async fn statistics_cover_count_average_min_max() {
        let (h, paper, _) = seeded().await;
        submit_scores(&h, paper.id, &[3, -2, 1]).await;

        let stats = h.state.decisions.review_statistics(paper.id).await.unwrap();
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.average_score, 0.67);
        assert_eq!(stats.min_score, -2);
        assert_eq!(stats.max_score, 3);
        assert_eq!(stats.reviews.len(), 3);
    }

    #[tokio::test]
    async fn withdrawal_is_author_only_and_blocked_after_decision() {
        let (h, paper, author) = seeded().await;

        let stranger = h.seed_user("Mallory", None).await;
        let err = h
            .state
            .decisions
            .withdraw_paper(paper.id, stranger.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden { .. }));

        let withdrawn = h
            .state
            .decisions
            .withdraw_paper(paper.id, author.id)
            .await
            .unwrap();
        assert_eq!(withdrawn.status, PaperStatus::Withdrawn);

        let (h, paper, author) = seeded().await;
        h.state
            .decisions
            .make_decision(paper.id, PaperStatus::Accepted, None)
            .await
            .unwrap();
        let err = h
            .state
            .decisions
            .withdraw_paper(paper.id, author.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PaperFinalized { .. }));
    }

    #[tokio::test]
    async fn decision_lookup_reflects_the_latest_status() {
        let (h, paper, _) = seeded().await;
        h.state
            .decisions
            .make_decision(paper.id, PaperStatus::Accepted, None)
            .await
            .unwrap();

        let view = h
            .state
            .decisions
            .decision_for_paper(paper.id)
            .await
            .unwrap();
        assert_eq!(view.status, PaperStatus::Accepted);
        assert_eq!(view.paper_id, paper.id);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round2(0.333_333), 0.33);
        assert_eq!(round2(0.335), 0.34);
        assert_eq!(round2(1.0), 1.0);
        assert_eq!(round2(-0.665), -0.67);
    }
}
