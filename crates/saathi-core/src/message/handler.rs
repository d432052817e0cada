//! Per-kind message handling for a registered agent.
//!
//! Task requests are routed by the shape of their `task` member: the first
//! shape the agent supports is run. Every other kind is answered without
//! running the agent.

use saathi_types::agent::AgentTask;
use saathi_types::error::AgentError;
use saathi_types::message::{A2aMessage, HandlerOutcome, MessageKind, RejectReason};
use serde_json::Value;
use tracing::{debug, warn};

use crate::agent::BoxAgent;

/// Handle `msg` on behalf of `agent`, registered as `msg.to()`.
pub async fn dispatch(agent: &BoxAgent, msg: &A2aMessage) -> Result<HandlerOutcome, AgentError> {
    match msg.kind() {
        MessageKind::TaskRequest => {
            let Some(raw) = msg.payload().get("task") else {
                warn!(to = msg.to(), "task request has no task member");
                return Ok(rejected());
            };
            let Some(task) = AgentTask::matching(raw, agent.capabilities()) else {
                warn!(to = msg.to(), "task matches no shape the agent supports");
                return Ok(rejected());
            };
            debug!(to = msg.to(), task = %task.kind(), "dispatching task");
            let result = agent.handle(&task).await?;
            Ok(HandlerOutcome::TaskCompleted {
                agent_type: agent.kind(),
                result,
            })
        }
        MessageKind::DataSharing => {
            let data_items = count_items(msg.payload().get("data"));
            debug!(to = msg.to(), data_items, "shared data received");
            Ok(HandlerOutcome::DataReceived {
                data_items,
                agent: msg.to().to_string(),
            })
        }
        kind @ (MessageKind::TaskResult | MessageKind::Coordination | MessageKind::Error) => {
            Ok(HandlerOutcome::Acknowledged { message_type: kind })
        }
    }
}

fn rejected() -> HandlerOutcome {
    HandlerOutcome::TaskRejected {
        reason: RejectReason::UnsupportedTaskType,
    }
}

/// Entries in a `data` member: object keys or array elements; a bare
/// scalar counts as one item.
fn count_items(data: Option<&Value>) -> usize {
    match data {
        None | Some(Value::Null) => 0,
        Some(Value::Object(map)) => map.len(),
        Some(Value::Array(items)) => items.len(),
        Some(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{EmotionalSupportAgent, StudyPlanningAgent};
    use crate::message::envelope;
    use crate::retry::RetryPolicy;
    use crate::test_support::supportive_generator;
    use saathi_types::agent::AgentKind;
    use saathi_types::message::Payload;
    use serde_json::json;

    fn study_agent() -> BoxAgent {
        BoxAgent::new(StudyPlanningAgent::new(
            supportive_generator(),
            RetryPolicy::none(),
        ))
    }

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn task_request_runs_agent() {
        let agent = BoxAgent::new(EmotionalSupportAgent::new(
            supportive_generator(),
            RetryPolicy::none(),
        ));
        let msg = A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            "emotional",
            payload(json!({"task": {"journal_entry": "stressed about exams"}})),
        );
        match dispatch(&agent, &msg).await.unwrap() {
            HandlerOutcome::TaskCompleted { agent_type, result } => {
                assert_eq!(agent_type, AgentKind::EmotionalSupport);
                assert!(result["emotional_insight"].is_string());
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_shape_is_rejected() {
        let msg = A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            "study",
            payload(json!({"task": {"recipe": "dal"}})),
        );
        let outcome = dispatch(&study_agent(), &msg).await.unwrap();
        assert_eq!(outcome.status(), "task_rejected");
    }

    #[tokio::test]
    async fn known_shape_for_other_agent_is_rejected() {
        let msg = A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            "study",
            payload(json!({"task": {"journal_entry": "hello"}})),
        );
        let outcome = dispatch(&study_agent(), &msg).await.unwrap();
        assert_eq!(
            outcome,
            HandlerOutcome::TaskRejected {
                reason: RejectReason::UnsupportedTaskType
            }
        );
    }

    fn emotional_agent() -> BoxAgent {
        BoxAgent::new(EmotionalSupportAgent::new(
            supportive_generator(),
            RetryPolicy::none(),
        ))
    }

    fn task_request(to: &str, task: Value) -> A2aMessage {
        A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            to,
            payload(json!({"task": task})),
        )
    }

    #[tokio::test]
    async fn null_emotion_tags_still_complete() {
        let msg = task_request(
            "emotional",
            json!({"journal_entry": "x", "emotion_tags": null}),
        );
        let outcome = dispatch(&emotional_agent(), &msg).await.unwrap();
        assert_eq!(outcome.status(), "task_completed");
    }

    #[tokio::test]
    async fn mixed_task_runs_the_shape_the_agent_supports() {
        let msg = task_request(
            "study",
            json!({"journal_entry": "x", "subjects": ["Maths"]}),
        );
        match dispatch(&study_agent(), &msg).await.unwrap() {
            HandlerOutcome::TaskCompleted { agent_type, result } => {
                assert_eq!(agent_type, AgentKind::StudyPlanning);
                assert_eq!(result["subjects_count"], 1);
            }
            other => panic!("expected completion, got {other:?}"),
        }

        // the same object sent to the emotional agent runs as a journal
        let msg = task_request(
            "emotional",
            json!({"journal_entry": "x", "subjects": ["Maths"]}),
        );
        match dispatch(&emotional_agent(), &msg).await.unwrap() {
            HandlerOutcome::TaskCompleted { agent_type, .. } => {
                assert_eq!(agent_type, AgentKind::EmotionalSupport);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn loosely_typed_hours_are_accepted() {
        for (hours, expected) in [(json!(7.5), 8), (Value::Null, 10)] {
            let msg = task_request(
                "study",
                json!({"subjects": ["Maths"], "available_hours": hours}),
            );
            match dispatch(&study_agent(), &msg).await.unwrap() {
                HandlerOutcome::TaskCompleted { result, .. } => {
                    assert_eq!(result["weekly_hours"], expected);
                }
                other => panic!("expected completion, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn missing_task_member_is_rejected() {
        let msg = A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            "study",
            payload(json!({"subjects": ["Maths"]})),
        );
        let outcome = dispatch(&study_agent(), &msg).await.unwrap();
        assert_eq!(outcome.status(), "task_rejected");
    }

    #[tokio::test]
    async fn invalid_task_is_an_error() {
        let msg = A2aMessage::new(
            MessageKind::TaskRequest,
            "orchestrator",
            "study",
            payload(json!({"task": {"subjects": []}})),
        );
        let err = dispatch(&study_agent(), &msg).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidTask(_)));
    }

    #[tokio::test]
    async fn data_sharing_counts_entries() {
        let msg = envelope::data_sharing(
            "emotional",
            "study",
            json!({"mood": 3, "topic": "exams"}),
        );
        let outcome = dispatch(&study_agent(), &msg).await.unwrap();
        assert_eq!(
            outcome,
            HandlerOutcome::DataReceived {
                data_items: 2,
                agent: "study".to_string()
            }
        );

        let empty = A2aMessage::new(MessageKind::DataSharing, "a", "study", Payload::new());
        match dispatch(&study_agent(), &empty).await.unwrap() {
            HandlerOutcome::DataReceived { data_items, .. } => assert_eq!(data_items, 0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_kinds_are_acknowledged() {
        let msg = envelope::coordination("emotional", "study", Payload::new());
        let outcome = dispatch(&study_agent(), &msg).await.unwrap();
        assert_eq!(
            outcome,
            HandlerOutcome::Acknowledged {
                message_type: MessageKind::Coordination
            }
        );
    }
}
