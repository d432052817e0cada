//! The `Agent` trait and its type-erased handle.
//!
//! Agents declare which `TaskKind`s they accept; the bus and orchestrator
//! check a task's kind against `capabilities()` before calling `handle`.

use std::future::Future;
use std::pin::Pin;

use saathi_types::agent::{AgentKind, AgentTask, TaskKind};
use saathi_types::error::AgentError;
use serde_json::Value;

/// A task-handling agent backed by a text generator.
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Task kinds this agent accepts.
    fn capabilities(&self) -> &'static [TaskKind];

    /// Result field that holds the text generated for a `task` kind.
    fn insight_field(&self, task: TaskKind) -> &'static str;

    /// Terms a good response is expected to mention.
    fn criteria(&self) -> &'static [&'static str];

    /// Run `task`. Generation failures are folded into the returned value;
    /// only invalid or unsupported tasks are errors.
    fn handle(&self, task: &AgentTask) -> impl Future<Output = Result<Value, AgentError>> + Send;
}

/// Object-safe version of [`Agent`] with a boxed future.
pub trait AgentDyn: Send + Sync {
    fn kind(&self) -> AgentKind;
    fn capabilities(&self) -> &'static [TaskKind];
    fn insight_field(&self, task: TaskKind) -> &'static str;
    fn criteria(&self) -> &'static [&'static str];
    fn handle_boxed<'a>(
        &'a self,
        task: &'a AgentTask,
    ) -> Pin<Box<dyn Future<Output = Result<Value, AgentError>> + Send + 'a>>;
}

impl<T: Agent> AgentDyn for T {
    fn kind(&self) -> AgentKind {
        Agent::kind(self)
    }

    fn capabilities(&self) -> &'static [TaskKind] {
        Agent::capabilities(self)
    }

    fn insight_field(&self, task: TaskKind) -> &'static str {
        Agent::insight_field(self, task)
    }

    fn criteria(&self) -> &'static [&'static str] {
        Agent::criteria(self)
    }

    fn handle_boxed<'a>(
        &'a self,
        task: &'a AgentTask,
    ) -> Pin<Box<dyn Future<Output = Result<Value, AgentError>> + Send + 'a>> {
        Box::pin(self.handle(task))
    }
}

/// Type-erased agent stored in the registry.
pub struct BoxAgent {
    inner: Box<dyn AgentDyn>,
}

impl BoxAgent {
    pub fn new<A: Agent + 'static>(agent: A) -> Self {
        Self {
            inner: Box::new(agent),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.inner.kind()
    }

    pub fn capabilities(&self) -> &'static [TaskKind] {
        self.inner.capabilities()
    }

    pub fn insight_field(&self, task: TaskKind) -> &'static str {
        self.inner.insight_field(task)
    }

    pub fn criteria(&self) -> &'static [&'static str] {
        self.inner.criteria()
    }

    pub fn supports(&self, kind: TaskKind) -> bool {
        self.capabilities().contains(&kind)
    }

    /// Run `task` after checking it against this agent's capabilities.
    pub async fn handle(&self, task: &AgentTask) -> Result<Value, AgentError> {
        if !self.supports(task.kind()) {
            return Err(AgentError::Unsupported(task.kind()));
        }
        self.inner.handle_boxed(task).await
    }
}

impl std::fmt::Debug for BoxAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxAgent")
            .field("kind", &self.inner.kind())
            .field("capabilities", &self.inner.capabilities())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saathi_types::agent::{JournalTask, StudyPlanTask};
    use serde_json::json;

    struct Listener;

    impl Agent for Listener {
        fn kind(&self) -> AgentKind {
            AgentKind::EmotionalSupport
        }

        fn capabilities(&self) -> &'static [TaskKind] {
            &[TaskKind::Journal]
        }

        fn insight_field(&self, _task: TaskKind) -> &'static str {
            "heard"
        }

        fn criteria(&self) -> &'static [&'static str] {
            &[]
        }

        async fn handle(&self, task: &AgentTask) -> Result<Value, AgentError> {
            match task {
                AgentTask::Journal(j) => Ok(json!({"heard": j.journal_entry})),
                other => Err(AgentError::Unsupported(other.kind())),
            }
        }
    }

    #[tokio::test]
    async fn boxed_agent_runs_supported_task() {
        let agent = BoxAgent::new(Listener);
        let task = AgentTask::Journal(JournalTask {
            journal_entry: "long week".into(),
            emotion_tags: vec![],
        });
        let value = agent.handle(&task).await.unwrap();
        assert_eq!(value["heard"], "long week");
        assert_eq!(agent.kind(), AgentKind::EmotionalSupport);
    }

    #[tokio::test]
    async fn boxed_agent_refuses_other_kinds() {
        let agent = BoxAgent::new(Listener);
        let task = AgentTask::StudyPlan(StudyPlanTask::new(vec!["Maths".into()]));
        assert!(!agent.supports(TaskKind::StudyPlan));
        let err = agent.handle(&task).await.unwrap_err();
        assert!(matches!(err, AgentError::Unsupported(TaskKind::StudyPlan)));
    }
}
