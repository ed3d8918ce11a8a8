//! Domain model types for the review lifecycle engine.

pub mod assignment;
pub mod conflict;
pub mod paper;
pub mod review;
pub mod user;

pub use assignment::{AssignmentStatus, ReviewerAssignment};
pub use conflict::ConflictOfInterest;
pub use paper::{Decision, Paper, PaperStatus};
pub use review::{AuthorReviewView, Review, MAX_SCORE, MIN_SCORE};
pub use user::UserProfile;
