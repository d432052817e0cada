//! Study planning agent: weekly plans from subjects, hours, and deadline.

use std::sync::Arc;

use saathi_types::agent::{AgentKind, AgentTask, StudyPlanTask, TaskKind};
use saathi_types::error::AgentError;
use serde_json::{Value, json};
use tracing::warn;

use super::handle::Agent;
use super::prompt::{build_prompt, generate_checked};
use crate::evaluation::clarity_check;
use crate::llm::BoxTextGenerator;
use crate::retry::RetryPolicy;

const ROLE: &str = "You are Agent Saathi, a practical and encouraging study coach.";

const INSTRUCTIONS: &str = "Create a simple weekly schedule covering subject distribution, \
study techniques, break recommendations, and progress tracking tips. Keep it practical \
and easy to follow.";

pub const FALLBACK_ADVICE: &str = "Start with the most challenging subject first, take \
regular breaks, and track your progress daily.";

pub struct StudyPlanningAgent {
    generator: Arc<BoxTextGenerator>,
    retry: RetryPolicy,
}

impl StudyPlanningAgent {
    pub fn new(generator: Arc<BoxTextGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }

    async fn plan(&self, task: &StudyPlanTask) -> Result<Value, AgentError> {
        let subjects: Vec<&str> = task
            .subjects
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if subjects.is_empty() {
            return Err(AgentError::InvalidTask("no subjects given".to_string()));
        }

        let prompt = build_prompt(
            ROLE,
            &[
                ("subjects", subjects.join(", ")),
                ("hours_per_week", task.available_hours.to_string()),
                ("deadline", task.deadline.clone()),
                ("learning_style", task.learning_style.clone()),
            ],
            INSTRUCTIONS,
        );

        match generate_checked(&self.generator, &self.retry, &prompt, |text| {
            !text.trim().is_empty() && clarity_check(text).is_clear
        })
        .await
        {
            Ok(plan) => Ok(json!({
                "study_plan": plan,
                "weekly_hours": task.available_hours,
                "subjects_count": subjects.len(),
            })),
            Err(e) => {
                warn!(error = %e, "study plan generation failed, using fallback");
                Ok(json!({
                    "error": format!("Study plan creation failed: {e}"),
                    "fallback_advice": FALLBACK_ADVICE,
                }))
            }
        }
    }
}

impl Agent for StudyPlanningAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::StudyPlanning
    }

    fn capabilities(&self) -> &'static [TaskKind] {
        &[TaskKind::StudyPlan]
    }

    fn insight_field(&self, _task: TaskKind) -> &'static str {
        "study_plan"
    }

    fn criteria(&self) -> &'static [&'static str] {
        &["schedule", "break", "progress"]
    }

    async fn handle(&self, task: &AgentTask) -> Result<Value, AgentError> {
        match task {
            AgentTask::StudyPlan(plan) => self.plan(plan).await,
            other => Err(AgentError::Unsupported(other.kind())),
        }
    }
}
