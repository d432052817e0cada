//! Request orchestration for Agent Saathi.
//!
//! `Orchestrator` turns a typed `AgentRequest` into a unified `AgentResponse`:
//! resolve the agent, run the task (directly or as a bus `TaskRequest`),
//! derive the evaluation and mood signals, record the result in the user's
//! memory (compacting it), persist it through the `ResultStore`, and
//! optionally broadcast it to the other agents. Every failure is turned into
//! an error response; `process` never returns `Err`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use saathi_types::error::{AgentError, OrchestratorError};
use saathi_types::message::{DeliveryResult, HandlerOutcome, MessageKind};
use saathi_types::request::{
    AgentRequest, AgentResponse, CompletedResponse, ErrorResponse, SystemStatus,
};
use saathi_types::task::TaskOutcome;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::context::SaathiContext;
use super::handle::BoxAgent;
use crate::evaluation::mood_score;
use crate::message::envelope;
use crate::parallel::ParallelTaskRunner;
use crate::storage::ResultStore;

/// Sender name used for envelopes the orchestrator puts on the bus.
pub const ORCHESTRATOR: &str = "orchestrator";

const UNKNOWN_AGENT_HINT: &str = "Please choose one of the available agents.";
const FAILURE_HINT: &str = "Something went wrong while handling your request. \
Please check your configuration and try again.";

/// Composes the registry, bus, memory, evaluator, and result store.
pub struct Orchestrator<S: ResultStore> {
    ctx: Arc<SaathiContext>,
    store: S,
}

impl<S: ResultStore + 'static> Orchestrator<S> {
    pub fn new(ctx: Arc<SaathiContext>, store: S) -> Self {
        Self { ctx, store }
    }

    pub fn context(&self) -> &Arc<SaathiContext> {
        &self.ctx
    }

    /// Handle one request end to end.
    pub async fn process(&self, request: AgentRequest) -> AgentResponse {
        let agent_name = request.agent.clone();
        match self.try_process(request).await {
            Ok(completed) => AgentResponse::Completed(completed),
            Err(e) => {
                warn!(agent = %agent_name, error = %e, "request failed");
                AgentResponse::Error(self.error_response(&agent_name, &e))
            }
        }
    }

    /// Fan `requests` out concurrently, keyed by their labels.
    ///
    /// Each outcome is the serialized completed response, or the error text
    /// of an error response.
    pub async fn run_parallel(
        self: &Arc<Self>,
        requests: Vec<(String, AgentRequest)>,
    ) -> BTreeMap<String, TaskOutcome> {
        let mut runner = ParallelTaskRunner::new(&self.ctx.config.parallel);
        for (label, request) in requests {
            let this = Arc::clone(self);
            runner.add_task(label, move || async move {
                match this.process(request).await {
                    AgentResponse::Completed(completed) => {
                        serde_json::to_value(&completed).map_err(|e| e.to_string())
                    }
                    AgentResponse::Error(failure) => Err(failure.error),
                }
            });
        }
        runner.run_all().await
    }

    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            status: "operational".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            agents_available: self.ctx.registry.names(),
            timestamp: Utc::now(),
        }
    }

    async fn try_process(
        &self,
        request: AgentRequest,
    ) -> Result<CompletedResponse, OrchestratorError> {
        let agent = self
            .ctx
            .registry
            .lookup(&request.agent)
            .ok_or_else(|| OrchestratorError::UnknownAgent(request.agent.clone()))?;

        debug!(
            agent = %request.agent,
            task = %request.task.kind(),
            via_bus = request.via_bus,
            "processing request"
        );
        let result = if request.via_bus {
            self.run_via_bus(&request).await?
        } else {
            agent.handle(&request.task).await?
        };

        let evaluation = result
            .get(agent.insight_field(request.task.kind()))
            .and_then(Value::as_str)
            .map(|text| {
                self.ctx
                    .evaluator
                    .evaluate(&request.agent, text, agent.criteria())
            });
        if let Some(evaluation) = &evaluation {
            self.ctx
                .evaluator
                .track(&request.agent, "quality_score", evaluation.score);
        }
        let mood = result
            .get("primary_emotion")
            .and_then(Value::as_str)
            .map(mood_score);

        let (_, memory) = self.ctx.memory.append_and_compact(
            &request.user_id,
            json!({
                "agent": request.agent,
                "task": request.task,
                "result": result,
            }),
            self.ctx.config.memory.max_entries,
        );
        let memory_size = self.ctx.memory.len(&request.user_id);

        let timestamp = Utc::now();
        let record = json!({
            "agent": request.agent,
            "agent_type": agent.kind(),
            "user_id": request.user_id,
            "result": result,
            "evaluation": evaluation,
            "mood_score": mood,
            "timestamp": timestamp,
        });
        let saved_path = match self.store.save(&record, &agent.kind().to_string()).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(agent = %request.agent, error = %e, "failed to persist result");
                None
            }
        };

        let shared_with = if request.share {
            self.share(&request.agent, &agent, &result).await
        } else {
            Vec::new()
        };

        info!(
            agent = %request.agent,
            user_id = %request.user_id,
            score = evaluation.as_ref().map(|e| e.score),
            memory_size,
            "request completed"
        );

        Ok(CompletedResponse {
            agent: request.agent,
            agent_type: agent.kind(),
            result,
            evaluation,
            mood_score: mood,
            memory,
            memory_size,
            saved_path,
            shared_with,
            timestamp,
        })
    }

    async fn run_via_bus(&self, request: &AgentRequest) -> Result<Value, OrchestratorError> {
        let msg = envelope::task_request(ORCHESTRATOR, request.agent.as_str(), &request.task);
        match self.ctx.bus.send(msg).await {
            DeliveryResult::Delivered {
                outcome: HandlerOutcome::TaskCompleted { result, .. },
                ..
            } => Ok(result),
            DeliveryResult::Delivered {
                outcome: HandlerOutcome::TaskRejected { .. },
                ..
            } => Err(AgentError::Unsupported(request.task.kind()).into()),
            DeliveryResult::Delivered { outcome, .. } => Err(OrchestratorError::Delivery(
                format!("unexpected handler outcome: {}", outcome.status()),
            )),
            DeliveryResult::Queued { .. } => {
                Err(OrchestratorError::UnknownAgent(request.agent.clone()))
            }
            DeliveryResult::DeliveryFailed { error, .. } => Err(OrchestratorError::Delivery(error)),
        }
    }

    /// Broadcast `result` from `name` to every other agent; returns the
    /// recipients that received it.
    async fn share(&self, name: &str, agent: &BoxAgent, result: &Value) -> Vec<String> {
        let payload = envelope::data_payload(json!({
            "agent": name,
            "agent_type": agent.kind(),
            "result": result,
        }));
        let deliveries = self
            .ctx
            .bus
            .broadcast(name, MessageKind::DataSharing, payload)
            .await;
        deliveries
            .into_iter()
            .filter(|(_, delivery)| delivery.is_delivered())
            .map(|(recipient, _)| recipient)
            .collect()
    }

    fn error_response(&self, agent_name: &str, error: &OrchestratorError) -> ErrorResponse {
        let (available_agents, fallback_message) = match error {
            OrchestratorError::UnknownAgent(_) => {
                (self.ctx.registry.names(), UNKNOWN_AGENT_HINT.to_string())
            }
            _ => (Vec::new(), FAILURE_HINT.to_string()),
        };
        ErrorResponse {
            error: error.to_string(),
            agent_type: agent_name.to_string(),
            available_agents,
            fallback_message,
            timestamp: Utc::now(),
        }
    }
}

impl<S: ResultStore> std::fmt::Debug for Orchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("agents", &self.ctx.registry.names())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::context::{COMMUNITY, EMOTIONAL, SOCIAL, STUDY};
    use crate::test_support::{BrokenStore, RecordingStore, supportive_generator};
    use saathi_types::agent::{
        AgentKind, AgentTask, CommunityProjectTask, CommunityTask, JournalTask, StoryTask,
        StudyPlanTask,
    };
    use saathi_types::config::SaathiConfig;

    fn context() -> Arc<SaathiContext> {
        let ctx = SaathiContext::new(SaathiConfig::default());
        ctx.register_default_agents(supportive_generator());
        Arc::new(ctx)
    }

    fn journal(entry: &str, tags: &[&str]) -> AgentTask {
        AgentTask::Journal(JournalTask {
            journal_entry: entry.to_string(),
            emotion_tags: tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    fn study(subjects: &[&str]) -> AgentTask {
        AgentTask::StudyPlan(StudyPlanTask::new(
            subjects.iter().map(|s| s.to_string()).collect(),
        ))
    }

    #[tokio::test]
    async fn direct_request_merges_signals_and_persists() {
        let store = RecordingStore::default();
        let orchestrator = Orchestrator::new(context(), store.clone());

        let response = orchestrator
            .process(AgentRequest::new(
                "u1",
                EMOTIONAL,
                journal("stressed about exams", &["stressed"]),
            ))
            .await;

        let completed = response.completed().expect("completed response");
        assert_eq!(completed.agent_type, AgentKind::EmotionalSupport);
        assert_eq!(completed.mood_score, Some(3));
        assert!(completed.evaluation.as_ref().unwrap().score >= 75.0);
        assert_eq!(completed.memory_size, 1);
        assert!(!completed.memory.compacted);
        assert!(completed.saved_path.is_some());
        assert!(completed.shared_with.is_empty());

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "emotional_support");
        assert_eq!(saved[0].1["user_id"], "u1");
    }

    #[tokio::test]
    async fn bus_request_matches_direct_result_shape() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        let response = orchestrator
            .process(AgentRequest::new("u1", STUDY, study(&["Maths", "Physics"])).via_bus())
            .await;

        let completed = response.completed().expect("completed response");
        assert_eq!(completed.result["subjects_count"], 2);
        assert!(completed.mood_score.is_none());
        let history = orchestrator.context().bus.history(ORCHESTRATOR, STUDY);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind(), MessageKind::TaskRequest);
    }

    #[tokio::test]
    async fn unknown_agent_lists_available_agents() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        let response = orchestrator
            .process(AgentRequest::new("u1", "ghost", journal("hi", &[])))
            .await;

        match response {
            AgentResponse::Error(failure) => {
                assert_eq!(failure.error, "Unknown agent type: ghost");
                assert_eq!(failure.agent_type, "ghost");
                assert_eq!(failure.available_agents, vec!["community", "emotional", "study"]);
            }
            other => panic!("expected error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mismatched_task_is_an_error_response() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        for request in [
            AgentRequest::new("u1", STUDY, journal("hello", &[])),
            AgentRequest::new("u1", STUDY, journal("hello", &[])).via_bus(),
        ] {
            let response = orchestrator.process(request).await;
            match response {
                AgentResponse::Error(failure) => {
                    assert_eq!(failure.error, "unsupported task type: journal");
                    assert!(failure.available_agents.is_empty());
                }
                other => panic!("expected error response, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn invalid_task_via_bus_is_an_error_response() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        let response = orchestrator
            .process(AgentRequest::new("u1", EMOTIONAL, journal("", &[])).via_bus())
            .await;
        assert!(response.is_error());
    }

    #[tokio::test]
    async fn persistence_failure_is_not_an_error() {
        let orchestrator = Orchestrator::new(context(), BrokenStore);
        let response = orchestrator
            .process(AgentRequest::new("u1", STUDY, study(&["History"])))
            .await;
        let completed = response.completed().expect("completed response");
        assert!(completed.saved_path.is_none());
    }

    #[tokio::test]
    async fn shared_result_reaches_other_agents() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        let response = orchestrator
            .process(AgentRequest::new("u1", EMOTIONAL, journal("long day", &[])).shared())
            .await;

        let completed = response.completed().expect("completed response");
        assert_eq!(completed.shared_with, vec![COMMUNITY, SOCIAL, STUDY]);
        let history = orchestrator.context().bus.history(EMOTIONAL, STUDY);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind(), MessageKind::DataSharing);
    }

    #[tokio::test]
    async fn project_plan_is_evaluated_over_the_bus() {
        let store = RecordingStore::default();
        let orchestrator = Orchestrator::new(context(), store.clone());
        let task = AgentTask::CommunityProject(CommunityProjectTask {
            issue: "litter in the park".into(),
            available_resources: vec![],
            volunteers: 8,
            timeline: "2 weeks".into(),
        });
        let response = orchestrator
            .process(AgentRequest::new("u1", COMMUNITY, task).via_bus())
            .await;

        let completed = response.completed().expect("completed response");
        assert_eq!(completed.agent_type, AgentKind::Community);
        assert_eq!(completed.result["volunteer_count"], 8);
        assert!(completed.evaluation.is_some());
        assert_eq!(store.saved.lock().unwrap()[0].0, "community");
    }

    #[tokio::test]
    async fn story_request_runs_social_agent() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        let task = AgentTask::InspirationalStory(StoryTask {
            experience: "moved to a new city".into(),
            transformation: "made new friends".into(),
            lesson_learned: "reach out first".into(),
            emotional_tone: "warm".into(),
        });
        let response = orchestrator
            .process(AgentRequest::new("u1", SOCIAL, task))
            .await;

        let completed = response.completed().expect("completed response");
        assert_eq!(completed.agent_type, AgentKind::SocialMedia);
        assert_eq!(completed.result["emotional_tone"], "warm");
        assert!(completed.evaluation.is_some());
    }

    #[tokio::test]
    async fn memory_is_compacted_to_configured_cap() {
        let mut config = SaathiConfig::default();
        config.memory.max_entries = 3;
        let ctx = SaathiContext::new(config);
        ctx.register_default_agents(supportive_generator());
        let orchestrator = Orchestrator::new(Arc::new(ctx), RecordingStore::default());

        let mut last = None;
        for i in 0..5 {
            last = Some(
                orchestrator
                    .process(AgentRequest::new(
                        "u1",
                        STUDY,
                        study(&[format!("Subject {i}").as_str()]),
                    ))
                    .await,
            );
        }

        let completed = last.unwrap();
        let completed = completed.completed().expect("completed response");
        assert_eq!(completed.memory_size, 3);
        assert!(completed.memory.compacted);
        assert_eq!(completed.memory.removed, Some(1));
    }

    #[tokio::test]
    async fn evaluation_is_tracked() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        orchestrator
            .process(AgentRequest::new("u1", EMOTIONAL, journal("tired", &[])))
            .await;
        let report = orchestrator
            .context()
            .evaluator
            .report(EMOTIONAL)
            .expect("tracked metrics");
        assert!(report.metrics.contains_key("quality_score"));
    }

    #[tokio::test]
    async fn parallel_requests_are_keyed_by_label() {
        let orchestrator = Arc::new(Orchestrator::new(context(), RecordingStore::default()));
        let outcomes = orchestrator
            .run_parallel(vec![
                (
                    "community".to_string(),
                    AgentRequest::new(
                        "u1",
                        COMMUNITY,
                        AgentTask::CommunityIssues(CommunityTask {
                            location: "Pune".into(),
                            community_needs: vec!["clean water".into()],
                        }),
                    ),
                ),
                (
                    "study".to_string(),
                    AgentRequest::new("u1", STUDY, study(&["Maths"])),
                ),
                (
                    "ghost".to_string(),
                    AgentRequest::new("u1", "ghost", study(&["Maths"])),
                ),
            ])
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes["community"].value().unwrap()["result"]["needs_identified"],
            1
        );
        assert!(outcomes["study"].is_ok());
        assert_eq!(outcomes["ghost"].error(), Some("Unknown agent type: ghost"));
        assert_eq!(orchestrator.context().memory.len("u1"), 2);
    }

    #[test]
    fn status_lists_agents() {
        let orchestrator = Orchestrator::new(context(), RecordingStore::default());
        let status = orchestrator.system_status();
        assert_eq!(status.status, "operational");
        assert_eq!(status.agents_available.len(), 4);
    }
}
