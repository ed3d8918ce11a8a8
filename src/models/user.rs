//! Author/reviewer profile as seen through the identity collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of an identity-service profile this engine reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub affiliation: Option<String>,
}

impl UserProfile {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            affiliation: None,
        }
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Affiliation-based conflict rule: a case-insensitive match counts only
    /// when both sides carry a non-empty affiliation.
    pub fn shares_affiliation(&self, other: &UserProfile) -> bool {
        match (self.affiliation.as_deref(), other.affiliation.as_deref()) {
            (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                a.trim().to_lowercase() == b.trim().to_lowercase()
            }
            _ => false,
        }
    }
}
