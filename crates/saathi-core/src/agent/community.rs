//! Community agent: root causes and community-led solutions for local needs,
//! and volunteer project plans for a single issue.

use std::sync::Arc;

use saathi_types::agent::{AgentKind, AgentTask, CommunityProjectTask, CommunityTask, TaskKind};
use saathi_types::error::AgentError;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::handle::Agent;
use super::prompt::{build_prompt, generate_checked};
use super::social::social_posts;
use crate::evaluation::{clarity_check, simplify_wording};
use crate::llm::BoxTextGenerator;
use crate::retry::RetryPolicy;

const ROLE: &str = "You are Agent Saathi, a community builder and social impact catalyst. \
Listen to community needs with compassion, identify root causes rather than symptoms, \
and suggest practical, community-led solutions.";

const INSTRUCTIONS: &str = "Provide a root cause analysis of the key issues, potential \
community-led solutions, who can help, quick-win opportunities, and long-term change \
strategies.";

const PROJECT_INSTRUCTIONS: &str = "Create a community project plan with goals and \
objectives, a step-by-step implementation plan, resource allocation, volunteer roles and \
responsibilities, success metrics, and sustainability considerations. Make it practical, \
scalable, and community-centered.";

pub const FALLBACK_ADVICE: &str = "Start by listening to community members, identify shared \
concerns, and build small collaborative projects that address immediate needs.";

pub const FALLBACK_PLAN: &str = "Start small, involve community members in planning, focus \
on one achievable goal first, and build from there.";

fn listed(items: &[String]) -> String {
    if items.is_empty() {
        "Not specified".to_string()
    } else {
        items.join(", ")
    }
}

fn reads_clearly(text: &str) -> bool {
    !text.trim().is_empty() && clarity_check(text).is_clear
}

pub struct CommunityAgent {
    generator: Arc<BoxTextGenerator>,
    retry: RetryPolicy,
}

impl CommunityAgent {
    pub fn new(generator: Arc<BoxTextGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }

    async fn analyze(&self, task: &CommunityTask) -> Result<Value, AgentError> {
        if task.location.trim().is_empty() {
            return Err(AgentError::InvalidTask("location is empty".to_string()));
        }

        let prompt = build_prompt(
            ROLE,
            &[
                ("location", task.location.clone()),
                ("needs", listed(&task.community_needs)),
            ],
            INSTRUCTIONS,
        );

        let accept = |text: &String| reads_clearly(text);
        match generate_checked(&self.generator, &self.retry, &prompt, accept).await {
            Ok(analysis) => {
                let clarity = clarity_check(&analysis);
                let analysis = if clarity.is_clear {
                    analysis
                } else {
                    debug!(location = %task.location, "simplifying unclear analysis");
                    simplify_wording(&analysis)
                };
                Ok(json!({
                    "issue_analysis": analysis,
                    "location": task.location,
                    "needs_identified": task.community_needs.len(),
                    "clarity_validation": clarity,
                }))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    location = %task.location,
                    "community analysis failed, using fallback"
                );
                Ok(json!({
                    "error": format!("Community analysis failed: {e}"),
                    "fallback_advice": FALLBACK_ADVICE,
                }))
            }
        }
    }

    async fn plan_project(&self, task: &CommunityProjectTask) -> Result<Value, AgentError> {
        if task.issue.trim().is_empty() {
            return Err(AgentError::InvalidTask("issue is empty".to_string()));
        }

        let prompt = build_prompt(
            ROLE,
            &[
                ("issue", task.issue.clone()),
                ("available_resources", listed(&task.available_resources)),
                ("volunteers", task.volunteers.to_string()),
                ("timeline", task.timeline.clone()),
            ],
            PROJECT_INSTRUCTIONS,
        );

        let accept = |text: &String| reads_clearly(text);
        match generate_checked(&self.generator, &self.retry, &prompt, accept).await {
            Ok(plan) => {
                let outreach = format!(
                    "New community project: {}. Join us in making a difference!",
                    task.issue.trim()
                );
                Ok(json!({
                    "project_plan": plan,
                    "social_content": social_posts(&outreach),
                    "volunteer_count": task.volunteers,
                    "timeline": task.timeline,
                }))
            }
            Err(e) => {
                warn!(error = %e, issue = %task.issue, "project planning failed, using fallback");
                Ok(json!({
                    "error": format!("Project planning failed: {e}"),
                    "fallback_plan": FALLBACK_PLAN,
                }))
            }
        }
    }
}

impl Agent for CommunityAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Community
    }

    fn capabilities(&self) -> &'static [TaskKind] {
        &[TaskKind::CommunityIssues, TaskKind::CommunityProject]
    }

    fn insight_field(&self, task: TaskKind) -> &'static str {
        match task {
            TaskKind::CommunityProject => "project_plan",
            _ => "issue_analysis",
        }
    }

    fn criteria(&self) -> &'static [&'static str] {
        &["community", "solution", "local"]
    }

    async fn handle(&self, task: &AgentTask) -> Result<Value, AgentError> {
        match task {
            AgentTask::CommunityIssues(issues) => self.analyze(issues).await,
            AgentTask::CommunityProject(project) => self.plan_project(project).await,
            other => Err(AgentError::Unsupported(other.kind())),
        }
    }
}
