use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub assignment: AssignmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssignmentConfig {
    /// Days between assignment creation and the review due date.
    pub due_period_days: i64,
}

impl EngineConfig {
    /// Build the configuration from defaults plus environment overrides.
    ///
    /// E.g. `PEERFLOW_ASSIGNMENT__DUE_PERIOD_DAYS=21` overrides the due period.
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("assignment.due_period_days", 14)?
            .add_source(Environment::default().separator("__").prefix("PEERFLOW"));

        builder.build()?.try_deserialize()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assignment: AssignmentConfig {
                due_period_days: 14,
            },
        }
    }
}
