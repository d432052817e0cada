//! Helper constructors for `A2aMessage` envelopes.
//!
//! Reduces boilerplate when building the common message kinds.

use saathi_types::agent::AgentTask;
use saathi_types::message::{A2aMessage, MessageKind, Payload};
use serde_json::Value;

/// Build a task request carrying `task` under the payload's `task` member.
pub fn task_request(
    from: impl Into<String>,
    to: impl Into<String>,
    task: &AgentTask,
) -> A2aMessage {
    A2aMessage::new(MessageKind::TaskRequest, from, to, task.to_payload())
}

/// Build a data-sharing message carrying `data` under the payload's `data`
/// member.
pub fn data_sharing(from: impl Into<String>, to: impl Into<String>, data: Value) -> A2aMessage {
    A2aMessage::new(MessageKind::DataSharing, from, to, data_payload(data))
}

/// Build a coordination message with a free-form payload.
pub fn coordination(
    from: impl Into<String>,
    to: impl Into<String>,
    payload: Payload,
) -> A2aMessage {
    A2aMessage::new(MessageKind::Coordination, from, to, payload)
}

/// Wrap `data` as `{"data": data}`.
pub fn data_payload(data: Value) -> Payload {
    let mut payload = Payload::new();
    payload.insert("data".to_string(), data);
    payload
}
