//! One-shot `journal`, `study`, `project`, and `story` commands.

use anyhow::Result;

use saathi_core::agent::context::{COMMUNITY, EMOTIONAL, SOCIAL, STUDY};
use saathi_types::agent::{
    AgentTask, CommunityProjectTask, JournalTask, StoryTask, StudyPlanTask,
};
use saathi_types::request::AgentRequest;

use super::render;
use crate::state::AppState;

/// Send a journal entry to the emotional support agent.
pub async fn journal(
    state: &AppState,
    user: String,
    entry: String,
    emotions: Vec<String>,
    json: bool,
) -> Result<()> {
    let task = AgentTask::Journal(JournalTask {
        journal_entry: entry,
        emotion_tags: emotions,
    });
    run(state, AgentRequest::new(user, EMOTIONAL, task), json).await
}

/// Ask the study planning agent for a weekly plan.
pub async fn study(
    state: &AppState,
    user: String,
    subjects: Vec<String>,
    hours: u32,
    deadline: String,
    style: String,
    json: bool,
) -> Result<()> {
    let task = AgentTask::StudyPlan(StudyPlanTask {
        subjects,
        available_hours: hours,
        deadline,
        learning_style: style,
    });
    run(state, AgentRequest::new(user, STUDY, task), json).await
}

/// Ask the community agent for a project plan.
pub async fn project(
    state: &AppState,
    user: String,
    issue: String,
    resources: Vec<String>,
    volunteers: u32,
    timeline: String,
    json: bool,
) -> Result<()> {
    let task = AgentTask::CommunityProject(CommunityProjectTask {
        issue,
        available_resources: resources,
        volunteers,
        timeline,
    });
    run(state, AgentRequest::new(user, COMMUNITY, task), json).await
}

pub async fn story(state: &AppState, user: String, task: StoryTask, json: bool) -> Result<()> {
    let task = AgentTask::InspirationalStory(task);
    run(state, AgentRequest::new(user, SOCIAL, task), json).await
}

async fn run(state: &AppState, request: AgentRequest, json: bool) -> Result<()> {
    let response = state.orchestrator.process(request).await;
    if json {
        return render::print_json(&response);
    }
    render::response(&response);
    println!();
    Ok(())
}
