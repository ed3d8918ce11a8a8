//! In-memory store implementation.
//!
//! Every mutating call takes the single write lock, so check-and-insert is
//! atomic and the uniqueness backstops in the [`Store`] contract hold under
//! concurrent callers.

use crate::errors::{EngineError, Result};
use crate::models::{
    AssignmentStatus, ConflictOfInterest, Paper, PaperStatus, Review, ReviewerAssignment,
    UserProfile,
};
use crate::store::Store;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    papers: HashMap<Uuid, Paper>,
    users: HashMap<Uuid, UserProfile>,
    assignments: HashMap<Uuid, ReviewerAssignment>,
    assignment_pairs: HashSet<(Uuid, Uuid)>,
    conflicts: HashMap<Uuid, ConflictOfInterest>,
    conflict_pairs: HashSet<(Uuid, Uuid)>,
    reviews: HashMap<Uuid, Review>,
    review_by_assignment: HashMap<Uuid, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // ========================================================================
    // Papers
    // ========================================================================

    async fn insert_paper(&self, paper: Paper) -> Result<Paper> {
        let mut inner = self.inner.write().await;
        inner.papers.insert(paper.id, paper.clone());
        Ok(paper)
    }

    async fn find_paper(&self, id: Uuid) -> Result<Option<Paper>> {
        let inner = self.inner.read().await;
        Ok(inner.papers.get(&id).cloned())
    }

    async fn update_paper_status(&self, id: Uuid, status: PaperStatus) -> Result<Paper> {
        let mut inner = self.inner.write().await;
        let paper = inner
            .papers
            .get_mut(&id)
            .ok_or(EngineError::PaperNotFound { id })?;
        paper.status = status;
        paper.updated_at = Utc::now();
        Ok(paper.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    async fn insert_user(&self, user: UserProfile) -> Result<UserProfile> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    async fn insert_assignment(
        &self,
        assignment: ReviewerAssignment,
    ) -> Result<ReviewerAssignment> {
        let mut inner = self.inner.write().await;
        let pair = (assignment.paper_id, assignment.reviewer_id);
        if !inner.assignment_pairs.insert(pair) {
            return Err(EngineError::DuplicateAssignment {
                paper_id: assignment.paper_id,
                reviewer_id: assignment.reviewer_id,
            });
        }
        inner.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn find_assignment(&self, id: Uuid) -> Result<Option<ReviewerAssignment>> {
        let inner = self.inner.read().await;
        Ok(inner.assignments.get(&id).cloned())
    }

    async fn assignment_exists(&self, paper_id: Uuid, reviewer_id: Uuid) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.assignment_pairs.contains(&(paper_id, reviewer_id)))
    }

    async fn assignments_for_paper(&self, paper_id: Uuid) -> Result<Vec<ReviewerAssignment>> {
        let inner = self.inner.read().await;
        let mut assignments: Vec<_> = inner
            .assignments
            .values()
            .filter(|a| a.paper_id == paper_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.assigned_at, a.id));
        Ok(assignments)
    }

    async fn assignments_for_reviewer(
        &self,
        reviewer_id: Uuid,
    ) -> Result<Vec<ReviewerAssignment>> {
        let inner = self.inner.read().await;
        let mut assignments: Vec<_> = inner
            .assignments
            .values()
            .filter(|a| a.reviewer_id == reviewer_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.assigned_at, a.id));
        Ok(assignments)
    }

    async fn update_assignment_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<ReviewerAssignment> {
        let mut inner = self.inner.write().await;
        let assignment = inner
            .assignments
            .get_mut(&id)
            .ok_or(EngineError::AssignmentNotFound { id })?;
        assignment.status = status;
        Ok(assignment.clone())
    }

    async fn delete_assignment(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let assignment = inner
            .assignments
            .remove(&id)
            .ok_or(EngineError::AssignmentNotFound { id })?;
        inner
            .assignment_pairs
            .remove(&(assignment.paper_id, assignment.reviewer_id));
        Ok(())
    }

    // ========================================================================
    // Conflicts of interest
    // ========================================================================

    async fn insert_conflict(&self, conflict: ConflictOfInterest) -> Result<ConflictOfInterest> {
        let mut inner = self.inner.write().await;
        let pair = (conflict.paper_id, conflict.reviewer_id);
        if !inner.conflict_pairs.insert(pair) {
            return Err(EngineError::AlreadyDeclared {
                paper_id: conflict.paper_id,
                reviewer_id: conflict.reviewer_id,
            });
        }
        inner.conflicts.insert(conflict.id, conflict.clone());
        Ok(conflict)
    }

    async fn conflict_exists(&self, paper_id: Uuid, reviewer_id: Uuid) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.conflict_pairs.contains(&(paper_id, reviewer_id)))
    }

    async fn conflicts_for_reviewer(&self, reviewer_id: Uuid) -> Result<Vec<ConflictOfInterest>> {
        let inner = self.inner.read().await;
        let mut conflicts: Vec<_> = inner
            .conflicts
            .values()
            .filter(|c| c.reviewer_id == reviewer_id)
            .cloned()
            .collect();
        conflicts.sort_by_key(|c| (c.declared_at, c.id));
        Ok(conflicts)
    }

    async fn delete_conflict(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.conflicts.remove(&id) {
            Some(conflict) => {
                inner
                    .conflict_pairs
                    .remove(&(conflict.paper_id, conflict.reviewer_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    async fn attach_review(&self, review: Review) -> Result<Review> {
        let mut inner = self.inner.write().await;
        let assignment_id = review.assignment_id;
        let status = inner
            .assignments
            .get(&assignment_id)
            .map(|a| a.status)
            .ok_or(EngineError::AssignmentNotFound { id: assignment_id })?;
        if status == AssignmentStatus::Completed
            || inner.review_by_assignment.contains_key(&assignment_id)
        {
            return Err(EngineError::AlreadyCompleted { assignment_id });
        }

        inner.review_by_assignment.insert(assignment_id, review.id);
        inner.reviews.insert(review.id, review.clone());
        if let Some(assignment) = inner.assignments.get_mut(&assignment_id) {
            assignment.status = AssignmentStatus::Completed;
        }
        Ok(review)
    }

    async fn reviews_for_paper(&self, paper_id: Uuid) -> Result<Vec<Review>> {
        let inner = self.inner.read().await;
        let mut reviews: Vec<_> = inner
            .reviews
            .values()
            .filter(|r| {
                inner
                    .assignments
                    .get(&r.assignment_id)
                    .is_some_and(|a| a.paper_id == paper_id)
            })
            .cloned()
            .collect();
        reviews.sort_by_key(|r| (r.submitted_at, r.id));
        Ok(reviews)
    }

    async fn review_for_assignment(&self, assignment_id: Uuid) -> Result<Option<Review>> {
        let inner = self.inner.read().await;
        Ok(inner
            .review_by_assignment
            .get(&assignment_id)
            .and_then(|review_id| inner.reviews.get(review_id))
            .cloned())
    }
}
