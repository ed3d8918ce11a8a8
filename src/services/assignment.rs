//! Assignment engine: creates reviewer assignments under the
//! conflict-of-interest and duplication rules, and drives the paper into
//! review on its first assignment.

use crate::audit::{AuditOutcome, AuditRecord, AuditSink};
use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};
use crate::events::{dispatch_best_effort, NotificationDispatcher, NotificationEvent};
use crate::models::{
    AssignmentStatus, ConflictOfInterest, PaperStatus, ReviewerAssignment,
};
use crate::store::Store;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

pub struct AssignmentService {
    store: Arc<dyn Store>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: Arc<dyn AuditSink>,
    due_period: Duration,
}

impl AssignmentService {
    pub fn new(
        store: Arc<dyn Store>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            audit,
            due_period: Duration::days(config.assignment.due_period_days),
        }
    }

    /// Assign a reviewer to a paper, or reject with a specific reason.
    ///
    /// Rule order: existence checks, self-review, affiliation match,
    /// declared conflict, duplicate assignment. On the paper's first
    /// assignment it transitions SUBMITTED → UNDER_REVIEW; later
    /// assignments leave the status untouched.
    pub async fn assign_reviewer(
        &self,
        paper_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<ReviewerAssignment> {
        let result = self.do_assign(paper_id, reviewer_id).await;
        self.audit.record(AuditRecord::new(
            None,
            "assign_reviewer",
            format!("paper:{paper_id} reviewer:{reviewer_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    async fn do_assign(&self, paper_id: Uuid, reviewer_id: Uuid) -> Result<ReviewerAssignment> {
        let paper = self
            .store
            .find_paper(paper_id)
            .await?
            .ok_or(EngineError::PaperNotFound { id: paper_id })?;
        let reviewer = self
            .store
            .find_user(reviewer_id)
            .await?
            .ok_or(EngineError::ReviewerNotFound { id: reviewer_id })?;

        if paper.main_author_id == reviewer_id {
            return Err(EngineError::ConflictOfInterest {
                message: "a paper's main author cannot review it".to_owned(),
            });
        }

        if let Some(author) = self.store.find_user(paper.main_author_id).await? {
            if reviewer.shares_affiliation(&author) {
                return Err(EngineError::ConflictOfInterest {
                    message: format!(
                        "reviewer and main author share an affiliation ({})",
                        author.affiliation.as_deref().unwrap_or_default()
                    ),
                });
            }
        }

        if self.store.conflict_exists(paper_id, reviewer_id).await? {
            return Err(EngineError::ConflictOfInterest {
                message: format!(
                    "reviewer {reviewer_id} has a declared conflict with paper {paper_id}"
                ),
            });
        }

        if self.store.assignment_exists(paper_id, reviewer_id).await? {
            return Err(EngineError::DuplicateAssignment {
                paper_id,
                reviewer_id,
            });
        }

        let due_at = chrono::Utc::now() + self.due_period;
        // The insert re-checks the pair under the write lock; two concurrent
        // callers cannot both get past the existence check above.
        let assignment = self
            .store
            .insert_assignment(ReviewerAssignment::new(paper_id, reviewer_id, due_at))
            .await?;

        if paper.status == PaperStatus::Submitted {
            self.store
                .update_paper_status(paper_id, PaperStatus::UnderReview)
                .await?;
        }

        dispatch_best_effort(
            self.dispatcher.as_ref(),
            NotificationEvent::AssignmentCreated {
                paper_id,
                reviewer_id,
                due_at,
            },
        )
        .await;

        metrics::counter!("peerflow_assignments_created_total").increment(1);
        tracing::info!(
            paper_id = %paper_id,
            reviewer_id = %reviewer_id,
            assignment_id = %assignment.id,
            "reviewer assigned"
        );

        Ok(assignment)
    }

    /// Best-effort cartesian assignment of reviewers to papers. Individual
    /// failures are skipped; the created assignments are returned.
    pub async fn bulk_assign(
        &self,
        paper_ids: &[Uuid],
        reviewer_ids: &[Uuid],
    ) -> Vec<ReviewerAssignment> {
        let mut created = Vec::new();
        for &paper_id in paper_ids {
            for &reviewer_id in reviewer_ids {
                match self.assign_reviewer(paper_id, reviewer_id).await {
                    Ok(assignment) => created.push(assignment),
                    Err(err) => {
                        tracing::debug!(
                            paper_id = %paper_id,
                            reviewer_id = %reviewer_id,
                            error = %err,
                            "bulk assignment skipped"
                        );
                    }
                }
            }
        }
        created
    }

    /// Reviewer accepts a pending assignment.
    pub async fn accept_assignment(&self, assignment_id: Uuid) -> Result<ReviewerAssignment> {
        self.respond(assignment_id, AssignmentStatus::Accepted, "accept_assignment")
            .await
    }

    /// Reviewer declines a pending assignment. DECLINED is terminal.
    pub async fn decline_assignment(&self, assignment_id: Uuid) -> Result<ReviewerAssignment> {
        self.respond(assignment_id, AssignmentStatus::Declined, "decline_assignment")
            .await
    }

    async fn respond(
        &self,
        assignment_id: Uuid,
        to: AssignmentStatus,
        action: &'static str,
    ) -> Result<ReviewerAssignment> {
        let found = self.store.find_assignment(assignment_id).await;
        let actor = found
            .as_ref()
            .ok()
            .and_then(|a| a.as_ref())
            .map(|a| a.reviewer_id);

        let result = match found {
            Err(err) => Err(err),
            Ok(None) => Err(EngineError::AssignmentNotFound { id: assignment_id }),
            Ok(Some(assignment)) if assignment.status != AssignmentStatus::Pending => {
                Err(EngineError::InvalidAssignmentState {
                    assignment_id,
                    status: assignment.status,
                })
            }
            Ok(Some(_)) => self.store.update_assignment_status(assignment_id, to).await,
        };

        self.audit.record(AuditRecord::new(
            actor,
            action,
            format!("assignment:{assignment_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    /// Chair removes a not-yet-completed assignment. When the last
    /// assignment of an UNDER_REVIEW paper goes away, the paper reverts to
    /// SUBMITTED.
    pub async fn remove_assignment(&self, assignment_id: Uuid) -> Result<()> {
        let result = self.do_remove(assignment_id).await;
        self.audit.record(AuditRecord::new(
            None,
            "remove_assignment",
            format!("assignment:{assignment_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    async fn do_remove(&self, assignment_id: Uuid) -> Result<()> {
        let assignment = self
            .store
            .find_assignment(assignment_id)
            .await?
            .ok_or(EngineError::AssignmentNotFound { id: assignment_id })?;
        if assignment.status == AssignmentStatus::Completed {
            return Err(EngineError::InvalidAssignmentState {
                assignment_id,
                status: assignment.status,
            });
        }

        let paper = self
            .store
            .find_paper(assignment.paper_id)
            .await?
            .ok_or(EngineError::PaperNotFound {
                id: assignment.paper_id,
            })?;
        if paper.status.is_final() || paper.status == PaperStatus::Withdrawn {
            return Err(EngineError::PaperFinalized {
                id: paper.id,
                status: paper.status,
            });
        }

        self.store.delete_assignment(assignment_id).await?;

        let remaining = self.store.assignments_for_paper(paper.id).await?;
        if remaining.is_empty() && paper.status == PaperStatus::UnderReview {
            self.store
                .update_paper_status(paper.id, PaperStatus::Submitted)
                .await?;
        }

        tracing::info!(
            assignment_id = %assignment_id,
            paper_id = %paper.id,
            "assignment removed"
        );
        Ok(())
    }

    /// Reviewer self-declares a conflict with a paper.
    pub async fn declare_conflict(
        &self,
        reviewer_id: Uuid,
        paper_id: Uuid,
        reason: impl Into<String>,
    ) -> Result<ConflictOfInterest> {
        let result = self.do_declare(reviewer_id, paper_id, reason.into()).await;
        self.audit.record(AuditRecord::new(
            Some(reviewer_id),
            "declare_conflict",
            format!("paper:{paper_id} reviewer:{reviewer_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    async fn do_declare(
        &self,
        reviewer_id: Uuid,
        paper_id: Uuid,
        reason: String,
    ) -> Result<ConflictOfInterest> {
        self.store
            .find_paper(paper_id)
            .await?
            .ok_or(EngineError::PaperNotFound { id: paper_id })?;
        self.store
            .find_user(reviewer_id)
            .await?
            .ok_or(EngineError::ReviewerNotFound { id: reviewer_id })?;

        if self.store.conflict_exists(paper_id, reviewer_id).await? {
            return Err(EngineError::AlreadyDeclared {
                paper_id,
                reviewer_id,
            });
        }

        let conflict = self
            .store
            .insert_conflict(ConflictOfInterest::new(paper_id, reviewer_id, reason))
            .await?;
        tracing::info!(
            paper_id = %paper_id,
            reviewer_id = %reviewer_id,
            "conflict of interest declared"
        );
        Ok(conflict)
    }

    /// Administrator removes a declared conflict record.
    pub async fn remove_conflict(&self, conflict_id: Uuid) -> Result<()> {
        let result = match self.store.delete_conflict(conflict_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::ConflictNotFound { id: conflict_id }),
            Err(err) => Err(err),
        };
        self.audit.record(AuditRecord::new(
            None,
            "remove_conflict",
            format!("conflict:{conflict_id}"),
            AuditOutcome::of(&result),
        ));
        result
    }

    pub async fn conflicts_for_reviewer(
        &self,
        reviewer_id: Uuid,
    ) -> Result<Vec<ConflictOfInterest>> {
        self.store.conflicts_for_reviewer(reviewer_id).await
    }

    pub async fn get_assignment(&self, assignment_id: Uuid) -> Result<ReviewerAssignment> {
        self.store
            .find_assignment(assignment_id)
            .await?
            .ok_or(EngineError::AssignmentNotFound { id: assignment_id })
    }

    pub async fn list_assignments_for_reviewer(
        &self,
        reviewer_id: Uuid,
    ) -> Result<Vec<ReviewerAssignment>> {
        self.store.assignments_for_reviewer(reviewer_id).await
    }

    pub async fn list_assignments_for_paper(
        &self,
        paper_id: Uuid,
    ) -> Result<Vec<ReviewerAssignment>> {
        self.store.assignments_for_paper(paper_id).await
    }
}
