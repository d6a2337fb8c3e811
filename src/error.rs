use thiserror::Error;

/// Errors raised by the GOAP engine.
///
/// Planning itself never fails: aborted or exhausted searches degrade to a
/// fallback plan and are reported through [`crate::SearchOutcome`]. The
/// variants here cover caller mistakes such as bad catalog entries, bad
/// configuration or unknown agents.
#[derive(Error, Debug)]
pub enum GoapError {
    #[error("Action cost must be a finite, non-negative number: {0}")]
    InvalidActionCost(String),
    #[error("Goal priority must be a finite number: {0}")]
    InvalidGoalPriority(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Agent not registered: {0}")]
    AgentNotFound(String),
    #[error("Fact source already registered: {0}")]
    FactSourceAlreadyRegistered(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GoapError>;
