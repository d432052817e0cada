use thiserror::Error;

use crate::agent::TaskKind;

/// Errors loading configuration or credentials. Fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not found in environment")]
    MissingCredential(String),

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Errors raised by an agent while handling a task.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("unsupported task type: {0}")]
    Unsupported(TaskKind),

    #[error("agent failure: {0}")]
    Internal(String),
}

/// Errors parsing an A2A envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(String),
}

/// Errors from result persistence.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Errors inside the orchestrator. Never returned to callers: the
/// orchestrator turns them into an error response.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Unknown agent type: {0}")]
    UnknownAgent(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("{0}")]
    Delivery(String),
}
