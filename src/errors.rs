//! Error types for the review lifecycle engine.
//!
//! Business-rule outcomes (conflicts, duplicates, invalid scores) are typed
//! client errors returned to the caller; only storage faults are server
//! errors. Each variant maps to a machine-readable [`ErrorCode`] so the
//! boundary layer can translate without string matching.

use crate::models::assignment::AssignmentStatus;
use crate::models::paper::PaperStatus;
use crate::models::review::{MAX_SCORE, MIN_SCORE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    InvalidScore,
    InvalidDecision,

    // Authorization errors (3xxx)
    Forbidden,

    // Resource errors (4xxx)
    PaperNotFound,
    ReviewerNotFound,
    AssignmentNotFound,
    ConflictNotFound,

    // Business-rule conflicts (5xxx)
    ConflictOfInterest,
    DuplicateAssignment,
    AlreadyCompleted,
    AlreadyDeclared,
    InvalidAssignmentState,
    PaperFinalized,

    // Internal errors (9xxx)
    StorageError,
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::InvalidScore => 1001,
            ErrorCode::InvalidDecision => 1002,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,

            // Resources (4xxx)
            ErrorCode::PaperNotFound => 4001,
            ErrorCode::ReviewerNotFound => 4002,
            ErrorCode::AssignmentNotFound => 4003,
            ErrorCode::ConflictNotFound => 4004,

            // Conflicts (5xxx)
            ErrorCode::ConflictOfInterest => 5001,
            ErrorCode::DuplicateAssignment => 5002,
            ErrorCode::AlreadyCompleted => 5003,
            ErrorCode::AlreadyDeclared => 5004,
            ErrorCode::InvalidAssignmentState => 5005,
            ErrorCode::PaperFinalized => 5006,

            // Internal (9xxx)
            ErrorCode::StorageError => 9001,
            ErrorCode::InternalError => 9002,
        }
    }
}

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Resource errors
    #[error("paper not found: {id}")]
    PaperNotFound { id: Uuid },

    #[error("reviewer not found: {id}")]
    ReviewerNotFound { id: Uuid },

    #[error("assignment not found: {id}")]
    AssignmentNotFound { id: Uuid },

    #[error("conflict record not found: {id}")]
    ConflictNotFound { id: Uuid },

    // Assignment rule violations
    #[error("conflict of interest: {message}")]
    ConflictOfInterest { message: String },

    #[error("reviewer {reviewer_id} is already assigned to paper {paper_id}")]
    DuplicateAssignment { paper_id: Uuid, reviewer_id: Uuid },

    #[error("conflict already declared by reviewer {reviewer_id} for paper {paper_id}")]
    AlreadyDeclared { paper_id: Uuid, reviewer_id: Uuid },

    // Review rule violations
    #[error("a review was already submitted for assignment {assignment_id}")]
    AlreadyCompleted { assignment_id: Uuid },

    #[error("score {score} is outside the allowed range [{min}, {max}]", min = MIN_SCORE, max = MAX_SCORE)]
    InvalidScore { score: i32 },

    // Decision rule violations
    #[error("invalid decision {status:?}: only ACCEPTED or REJECTED are allowed")]
    InvalidDecision { status: String },

    // Lifecycle violations
    #[error("assignment {assignment_id} cannot change state from {status:?}")]
    InvalidAssignmentState {
        assignment_id: Uuid,
        status: AssignmentStatus,
    },

    #[error("paper {id} already has a final status ({status:?})")]
    PaperFinalized { id: Uuid, status: PaperStatus },

    // Authorization
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    // Infrastructure
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::PaperNotFound { .. } => ErrorCode::PaperNotFound,
            EngineError::ReviewerNotFound { .. } => ErrorCode::ReviewerNotFound,
            EngineError::AssignmentNotFound { .. } => ErrorCode::AssignmentNotFound,
            EngineError::ConflictNotFound { .. } => ErrorCode::ConflictNotFound,
            EngineError::ConflictOfInterest { .. } => ErrorCode::ConflictOfInterest,
            EngineError::DuplicateAssignment { .. } => ErrorCode::DuplicateAssignment,
            EngineError::AlreadyDeclared { .. } => ErrorCode::AlreadyDeclared,
            EngineError::AlreadyCompleted { .. } => ErrorCode::AlreadyCompleted,
            EngineError::InvalidScore { .. } => ErrorCode::InvalidScore,
            EngineError::InvalidDecision { .. } => ErrorCode::InvalidDecision,
            EngineError::InvalidAssignmentState { .. } => ErrorCode::InvalidAssignmentState,
            EngineError::PaperFinalized { .. } => ErrorCode::PaperFinalized,
            EngineError::Forbidden { .. } => ErrorCode::Forbidden,
            EngineError::Storage(_) => ErrorCode::StorageError,
            EngineError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Expected business-rule outcome, surfaced to the caller as-is.
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Genuine infrastructure fault.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            EngineError::Storage(_) | EngineError::Internal { .. }
        )
    }
}
