//! Orchestrator request and response envelopes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::{AgentKind, AgentTask};
use crate::evaluation::Evaluation;
use crate::memory::CompactionReport;

/// A typed request for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Whose memory log the result is recorded in.
    pub user_id: String,
    /// Registered agent name (e.g. "emotional").
    pub agent: String,
    pub task: AgentTask,
    /// Route through the message bus instead of calling the agent directly.
    #[serde(default)]
    pub via_bus: bool,
    /// Broadcast the result to every other agent.
    #[serde(default)]
    pub share: bool,
}

impl AgentRequest {
    pub fn new(user_id: impl Into<String>, agent: impl Into<String>, task: AgentTask) -> Self {
        Self {
            user_id: user_id.into(),
            agent: agent.into(),
            task,
            via_bus: false,
            share: false,
        }
    }

    pub fn via_bus(mut self) -> Self {
        self.via_bus = true;
        self
    }

    pub fn shared(mut self) -> Self {
        self.share = true;
        self
    }
}

/// Unified response from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentResponse {
    Completed(CompletedResponse),
    Error(ErrorResponse),
}

impl AgentResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, AgentResponse::Error(_))
    }

    pub fn completed(&self) -> Option<&CompletedResponse> {
        match self {
            AgentResponse::Completed(c) => Some(c),
            AgentResponse::Error(_) => None,
        }
    }
}

/// An agent result merged with derived signals and bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedResponse {
    pub agent: String,
    pub agent_type: AgentKind,
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_score: Option<u8>,
    pub memory: CompactionReport,
    /// Records held for the user after compaction.
    pub memory_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Structured failure; always carries human-readable text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_agents: Vec<String>,
    pub fallback_message: String,
    pub timestamp: DateTime<Utc>,
}

/// System health summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    pub version: String,
    pub agents_available: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::JournalTask;

    #[test]
    fn test_request_builder_flags() {
        let req = AgentRequest::new(
            "u1",
            "emotional",
            AgentTask::Journal(JournalTask {
                journal_entry: "tired".into(),
                emotion_tags: vec![],
            }),
        )
        .via_bus()
        .shared();
        assert!(req.via_bus);
        assert!(req.share);
    }

    #[test]
    fn test_error_response_tagged() {
        let resp = AgentResponse::Error(ErrorResponse {
            error: "Unknown agent type: ghost".into(),
            agent_type: "ghost".into(),
            available_agents: vec!["emotional".into()],
            fallback_message: "Please pick one of the available agents.".into(),
            timestamp: Utc::now(),
        });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["available_agents"][0], "emotional");
        assert!(resp.is_error());
        assert!(resp.completed().is_none());
    }
}
