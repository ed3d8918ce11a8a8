//! Storage seam for the review lifecycle engine.
//!
//! Persistence mechanics live behind [`Store`]; the engine only relies on
//! the contract below. Mutating operations that guard a uniqueness invariant
//! (one assignment per (paper, reviewer), one review per assignment, one
//! declared conflict per pair) must make the check-and-insert atomic, the
//! way a unique constraint backstops a service-level existence check.

mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use crate::models::{
    AssignmentStatus, ConflictOfInterest, Paper, PaperStatus, Review, ReviewerAssignment,
    UserProfile,
};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Store: Send + Sync {
    // ========================================================================
    // Papers
    // ========================================================================

    /// Upsert a paper row. Submission itself is an external flow; the store
    /// still has to hold the record the engine mutates.
    async fn insert_paper(&self, paper: Paper) -> Result<Paper>;

    async fn find_paper(&self, id: Uuid) -> Result<Option<Paper>>;

    /// Set the paper status and bump its updated-at timestamp.
    /// Fails with `PaperNotFound` for an unknown id.
    async fn update_paper_status(&self, id: Uuid, status: PaperStatus) -> Result<Paper>;

    // ========================================================================
    // Users (read-mostly mirror of the identity collaborator)
    // ========================================================================

    async fn insert_user(&self, user: UserProfile) -> Result<UserProfile>;

    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>>;

    // ========================================================================
    // Assignments
    // ========================================================================

    /// Insert a new assignment. Fails with `DuplicateAssignment` when the
    /// (paper, reviewer) pair is already assigned; this is the atomic
    /// backstop for two concurrent assignment attempts.
    async fn insert_assignment(&self, assignment: ReviewerAssignment)
        -> Result<ReviewerAssignment>;

    async fn find_assignment(&self, id: Uuid) -> Result<Option<ReviewerAssignment>>;

    async fn assignment_exists(&self, paper_id: Uuid, reviewer_id: Uuid) -> Result<bool>;

    /// Assignments for a paper, ordered by assignment time.
    async fn assignments_for_paper(&self, paper_id: Uuid) -> Result<Vec<ReviewerAssignment>>;

    /// Assignments for a reviewer across papers, ordered by assignment time.
    async fn assignments_for_reviewer(&self, reviewer_id: Uuid)
        -> Result<Vec<ReviewerAssignment>>;

    /// Fails with `AssignmentNotFound` for an unknown id.
    async fn update_assignment_status(
        &self,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<ReviewerAssignment>;

    /// Fails with `AssignmentNotFound` for an unknown id.
    async fn delete_assignment(&self, id: Uuid) -> Result<()>;

    // ========================================================================
    // Conflicts of interest
    // ========================================================================

    /// Insert a declared conflict. Fails with `AlreadyDeclared` when the
    /// (paper, reviewer) pair already has one.
    async fn insert_conflict(&self, conflict: ConflictOfInterest) -> Result<ConflictOfInterest>;

    async fn conflict_exists(&self, paper_id: Uuid, reviewer_id: Uuid) -> Result<bool>;

    async fn conflicts_for_reviewer(&self, reviewer_id: Uuid) -> Result<Vec<ConflictOfInterest>>;

    /// Returns whether a record was removed.
    async fn delete_conflict(&self, id: Uuid) -> Result<bool>;

    // ========================================================================
    // Reviews
    // ========================================================================

    /// Attach a review to its assignment and transition the assignment to
    /// COMPLETED, atomically. Fails with `AlreadyCompleted` when a review
    /// already exists, so exactly one of two concurrent submissions wins.
    async fn attach_review(&self, review: Review) -> Result<Review>;

    /// Reviews whose owning assignment belongs to the paper, ordered by
    /// submission time.
    async fn reviews_for_paper(&self, paper_id: Uuid) -> Result<Vec<Review>>;

    async fn review_for_assignment(&self, assignment_id: Uuid) -> Result<Option<Review>>;
}
