//! Agent-to-agent (A2A) messaging domain types.
//!
//! Defines the immutable `A2aMessage` envelope exchanged on the message bus,
//! the closed set of message kinds, and the structured `DeliveryResult`
//! returned for every send attempt.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::agent::AgentKind;
use crate::error::EnvelopeError;

/// Opaque message body. The bus only hands it to the target's handler.
pub type Payload = Map<String, Value>;

/// Closed set of A2A message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    TaskRequest,
    TaskResult,
    DataSharing,
    Coordination,
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::TaskRequest => write!(f, "task_request"),
            MessageKind::TaskResult => write!(f, "task_result"),
            MessageKind::DataSharing => write!(f, "data_sharing"),
            MessageKind::Coordination => write!(f, "coordination"),
            MessageKind::Error => write!(f, "error"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task_request" => Ok(MessageKind::TaskRequest),
            "task_result" => Ok(MessageKind::TaskResult),
            "data_sharing" => Ok(MessageKind::DataSharing),
            "coordination" => Ok(MessageKind::Coordination),
            "error" => Ok(MessageKind::Error),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// Protocol metadata stamped on every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    pub version: String,
    pub protocol: String,
}

impl Default for EnvelopeMetadata {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            protocol: "A2A".to_string(),
        }
    }
}

/// A message sent from one agent to another.
///
/// Fields are private: once built, an envelope cannot be changed. The
/// serialized field names are the A2A wire names (`message_id`,
/// `message_type`, `from_agent`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2aMessage {
    #[serde(rename = "message_id")]
    id: String,
    #[serde(rename = "message_type")]
    kind: MessageKind,
    #[serde(rename = "from_agent")]
    from: String,
    #[serde(rename = "to_agent")]
    to: String,
    #[serde(rename = "content")]
    payload: Payload,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    metadata: EnvelopeMetadata,
}

impl A2aMessage {
    /// Build a new envelope with a fresh id and the current time.
    pub fn new(
        kind: MessageKind,
        from: impl Into<String>,
        to: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            id: format!("msg_{}", Uuid::now_v7().simple()),
            kind,
            from: from.into(),
            to: to.into(),
            payload,
            created_at: Utc::now(),
            metadata: EnvelopeMetadata::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &EnvelopeMetadata {
        &self.metadata
    }

    /// Render the envelope as a JSON object using the wire field names.
    pub fn to_dict(&self) -> Value {
        json!({
            "message_id": self.id,
            "message_type": self.kind,
            "from_agent": self.from,
            "to_agent": self.to,
            "content": self.payload,
            "timestamp": self.created_at,
            "metadata": self.metadata,
        })
    }

    /// Parse an envelope previously produced by [`A2aMessage::to_dict`].
    pub fn from_dict(value: &Value) -> Result<Self, EnvelopeError> {
        Self::deserialize(value).map_err(|e| EnvelopeError::Malformed(e.to_string()))
    }
}

/// Why a message was recorded but not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueReason {
    AgentNotRegistered,
}

/// Why a registered agent refused a task request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnsupportedTaskType,
}

/// What the target agent's handler made of a delivered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandlerOutcome {
    /// The agent ran the requested task.
    TaskCompleted { agent_type: AgentKind, result: Value },
    /// The task shape is not one the agent supports.
    TaskRejected { reason: RejectReason },
    /// A data-sharing message was accepted.
    DataReceived { data_items: usize, agent: String },
    /// Result, coordination, and error messages are acknowledged only.
    Acknowledged { message_type: MessageKind },
}

impl HandlerOutcome {
    /// The snake_case status tag of this outcome.
    pub fn status(&self) -> &'static str {
        match self {
            HandlerOutcome::TaskCompleted { .. } => "task_completed",
            HandlerOutcome::TaskRejected { .. } => "task_rejected",
            HandlerOutcome::DataReceived { .. } => "data_received",
            HandlerOutcome::Acknowledged { .. } => "acknowledged",
        }
    }
}

/// Outcome of a single `MessageBus::send`.
///
/// Sending never fails with an error; every outcome is one of these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// The target is registered and its handler ran.
    Delivered {
        message_id: String,
        outcome: HandlerOutcome,
    },
    /// The target is not registered. Terminal: the bus never retries.
    Queued {
        message_id: String,
        reason: QueueReason,
    },
    /// The target's handler raised an error or panicked.
    DeliveryFailed { message_id: String, error: String },
}

impl DeliveryResult {
    /// The snake_case status tag of this result.
    pub fn status(&self) -> &'static str {
        match self {
            DeliveryResult::Delivered { .. } => "delivered",
            DeliveryResult::Queued { .. } => "queued",
            DeliveryResult::DeliveryFailed { .. } => "delivery_failed",
        }
    }

    pub fn message_id(&self) -> &str {
        match self {
            DeliveryResult::Delivered { message_id, .. }
            | DeliveryResult::Queued { message_id, .. }
            | DeliveryResult::DeliveryFailed { message_id, .. } => message_id,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered { .. })
    }

    /// The handler outcome, when the message reached a handler.
    pub fn outcome(&self) -> Option<&HandlerOutcome> {
        match self {
            DeliveryResult::Delivered { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_new_message_has_unique_ids() {
        let a = A2aMessage::new(MessageKind::Coordination, "a", "b", Payload::new());
        let b = A2aMessage::new(MessageKind::Coordination, "a", "b", Payload::new());
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("msg_"));
        assert_eq!(a.metadata().protocol, "A2A");
    }

    #[test]
    fn test_to_dict_uses_wire_names() {
        let msg = A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            "emotional",
            payload(json!({"task": {"journal_entry": "long day"}})),
        );
        let dict = msg.to_dict();

        assert_eq!(dict["message_type"], "task_request");
        assert_eq!(dict["from_agent"], "orchestrator");
        assert_eq!(dict["to_agent"], "emotional");
        assert_eq!(dict["content"]["task"]["journal_entry"], "long day");
        assert_eq!(dict["metadata"]["version"], "1.0");
    }

    #[test]
    fn test_dict_roundtrip_preserves_every_field() {
        for kind in [
            MessageKind::TaskRequest,
            MessageKind::TaskResult,
            MessageKind::DataSharing,
            MessageKind::Coordination,
            MessageKind::Error,
        ] {
            let msg = A2aMessage::new(kind, "study", "emotional", payload(json!({"n": 1})));
            let parsed = A2aMessage::from_dict(&msg.to_dict()).unwrap();
            assert_eq!(parsed, msg);
            assert_eq!(parsed.kind(), kind);
        }
    }

    #[test]
    fn test_from_dict_rejects_unknown_kind() {
        let mut dict = A2aMessage::new(MessageKind::Error, "a", "b", Payload::new()).to_dict();
        dict["message_type"] = json!("gossip");
        let err = A2aMessage::from_dict(&dict).unwrap_err();
        assert!(err.to_string().contains("malformed envelope"));
    }

    #[test]
    fn test_message_kind_from_str() {
        assert_eq!(
            "DATA_SHARING".parse::<MessageKind>().unwrap(),
            MessageKind::DataSharing
        );
        assert!("broadcast".parse::<MessageKind>().is_err());
        assert_eq!(MessageKind::TaskResult.to_string(), "task_result");
    }

    #[test]
    fn test_delivery_result_serializes_nested_status() {
        let result = DeliveryResult::Delivered {
            message_id: "msg_1".to_string(),
            outcome: HandlerOutcome::TaskCompleted {
                agent_type: AgentKind::EmotionalSupport,
                result: json!({"emotional_insight": "breathe"}),
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "delivered");
        assert_eq!(value["outcome"]["status"], "task_completed");
        assert_eq!(value["outcome"]["agent_type"], "emotional_support");
        assert_eq!(result.outcome().unwrap().status(), "task_completed");
    }

    #[test]
    fn test_queued_result_shape() {
        let result = DeliveryResult::Queued {
            message_id: "msg_2".to_string(),
            reason: QueueReason::AgentNotRegistered,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "queued");
        assert_eq!(value["reason"], "agent_not_registered");
        assert!(!result.is_delivered());
        assert!(result.outcome().is_none());
    }
}
