//! Engine services and their wiring.

use crate::audit::AuditSink;
use crate::config::EngineConfig;
use crate::events::NotificationDispatcher;
use crate::store::Store;
use std::sync::Arc;

pub mod assignment;
pub mod decision;
pub mod review;

pub use assignment::AssignmentService;
pub use decision::{BulkDecisionOutcome, DecisionService, DecisionView, ReviewStatistics};
pub use review::ReviewService;

/// A container for all services, handed to the boundary layer.
#[derive(Clone)]
pub struct AppState {
    pub assignments: Arc<AssignmentService>,
    pub reviews: Arc<ReviewService>,
    pub decisions: Arc<DecisionService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            assignments: Arc::new(AssignmentService::new(
                store.clone(),
                dispatcher.clone(),
                audit.clone(),
                config,
            )),
            reviews: Arc::new(ReviewService::new(
                store.clone(),
                dispatcher.clone(),
                audit.clone(),
            )),
            decisions: Arc::new(DecisionService::new(store, dispatcher, audit)),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::audit::RecordingAuditSink;
    use crate::events::RecordingDispatcher;
    use crate::models::{Paper, UserProfile};
    use crate::store::MemoryStore;

    pub struct Harness {
        pub store: Arc<MemoryStore>,
        pub dispatcher: Arc<RecordingDispatcher>,
        pub audit: Arc<RecordingAuditSink>,
        pub state: AppState,
    }

    pub fn harness() -> Harness {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("peerflow=debug")
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let audit = Arc::new(RecordingAuditSink::new());
        let state = AppState::new(
            store.clone(),
            dispatcher.clone(),
            audit.clone(),
            &EngineConfig::default(),
        );
        Harness {
            store,
            dispatcher,
            audit,
            state,
        }
    }

    impl Harness {
        /// Seed a reviewer with an optional affiliation.
        pub async fn seed_user(&self, name: &str, affiliation: Option<&str>) -> UserProfile {
            let mut user = UserProfile::new(name, format!("{}@conf.test", name.replace(' ', ".")));
            if let Some(affiliation) = affiliation {
                user = user.with_affiliation(affiliation);
            }
            self.store.insert_user(user).await.unwrap()
        }

        /// Seed a SUBMITTED paper owned by the given author.
        pub async fn seed_paper(&self, title: &str, author: &UserProfile) -> Paper {
            self.store
                .insert_paper(Paper::new(title, "abstract", author.id))
                .await
                .unwrap()
        }
    }
}
