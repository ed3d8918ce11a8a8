//! peerflow — review assignment and decision lifecycle engine.
//!
//! The engine covers the rules that move a submitted paper through reviewer
//! assignment, conflict-of-interest enforcement, review submission, and the
//! final accept/reject decision. It owns no wire protocol: a request-handling
//! boundary layer invokes the services, and the engine calls out through
//! seams for storage ([`store::Store`]), notification delivery
//! ([`events::NotificationDispatcher`]), and activity logging
//! ([`audit::AuditSink`]).

pub mod audit;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use errors::{EngineError, ErrorCode, Result};
pub use services::AppState;
