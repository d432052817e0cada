//! Canned walkthrough across every agent.
//!
//! Steps, all for one user:
//! 1. A journal entry to the emotional agent, routed over the message bus.
//! 2. A study plan and a community analysis, run in parallel.
//! 3. The emotional insight broadcast to the other agents, plus a
//!    coordination note to the study agent.
//! 4. A short series of check-ins run as a long-running operation, paused
//!    and resumed once.
//! 5. A memory compaction summary.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use serde_json::{Value, json};

use saathi_core::agent::context::{COMMUNITY, EMOTIONAL, SOCIAL, STUDY};
use saathi_core::agent::orchestrator::ORCHESTRATOR;
use saathi_core::message::envelope;
use saathi_core::operation::LongRunningOperation;
use saathi_types::agent::{AgentTask, CommunityTask, JournalTask, StoryTask, StudyPlanTask};
use saathi_types::message::{DeliveryResult, MessageKind, Payload};
use saathi_types::request::{AgentRequest, AgentResponse};
use saathi_types::task::TaskOutcome;

use super::render;
use crate::state::AppState;

const JOURNAL_ENTRY: &str = "I've been feeling overwhelmed with my studies and family \
expectations. Sometimes I feel like I'm not good enough.";

const CHECK_INS: &[&str] = &[
    "Slept better last night and finished one chapter.",
    "Felt anxious before the mock test but it went okay.",
    "Spent the evening with friends, feeling lighter.",
];

/// Cap used for the closing compaction step.
const DEMO_MEMORY_CAP: usize = 3;

pub async fn demo(state: &AppState, user: &str, json: bool) -> Result<()> {
    let ctx = state.context();
    let mut summary = serde_json::Map::new();

    if !json {
        println!();
        println!("  {} Agent Saathi demo", style("⚡").bold());
    }

    // 1. Emotional support over the bus
    let journal = AgentRequest::new(
        user,
        EMOTIONAL,
        AgentTask::Journal(JournalTask {
            journal_entry: JOURNAL_ENTRY.to_string(),
            emotion_tags: vec!["overwhelmed".to_string(), "anxious".to_string()],
        }),
    )
    .via_bus();
    let emotional = state.orchestrator.process(journal).await;
    if !json {
        render::heading("Emotional support");
        render::response(&emotional);
    }

    // 2. Study plan and community analysis in parallel
    let parallel = state
        .orchestrator
        .run_parallel(vec![
            (
                "study_plan".to_string(),
                AgentRequest::new(
                    user,
                    STUDY,
                    AgentTask::StudyPlan(StudyPlanTask {
                        subjects: vec![
                            "Mathematics".to_string(),
                            "Physics".to_string(),
                            "Chemistry".to_string(),
                        ],
                        available_hours: 15,
                        deadline: "6 weeks".to_string(),
                        learning_style: "visual".to_string(),
                    }),
                ),
            ),
            (
                "community_analysis".to_string(),
                AgentRequest::new(
                    user,
                    COMMUNITY,
                    AgentTask::CommunityIssues(CommunityTask {
                        location: "Mumbai, Maharashtra".to_string(),
                        community_needs: vec![
                            "youth mental health".to_string(),
                            "educational support".to_string(),
                            "job opportunities".to_string(),
                        ],
                    }),
                ),
            ),
            (
                "social_story".to_string(),
                AgentRequest::new(
                    user,
                    SOCIAL,
                    AgentTask::InspirationalStory(StoryTask {
                        experience: "struggled through board exam season".to_string(),
                        transformation: "started journaling and asking friends for help"
                            .to_string(),
                        lesson_learned: "nobody has to get through it alone".to_string(),
                        emotional_tone: "hopeful".to_string(),
                    }),
                ),
            ),
        ])
        .await;
    if !json {
        render::heading("Parallel tasks");
        for (label, outcome) in &parallel {
            print_outcome(label, outcome);
        }
    }

    // 3. Share the emotional insight with everyone else
    let shared = match emotional.completed() {
        Some(done) => json!({
            "agent": done.agent,
            "primary_emotion": done.result.get("primary_emotion"),
            "mood_score": done.mood_score,
        }),
        None => json!({"agent": EMOTIONAL, "status": "unavailable"}),
    };
    let broadcast = ctx
        .bus
        .broadcast(
            ORCHESTRATOR,
            MessageKind::DataSharing,
            envelope::data_payload(shared),
        )
        .await;
    let mut note = Payload::new();
    note.insert("event".to_string(), json!("plan_review"));
    note.insert("reason".to_string(), json!("user reported feeling overwhelmed"));
    let coordination = ctx
        .bus
        .send(envelope::coordination(ORCHESTRATOR, STUDY, note))
        .await;
    if !json {
        render::heading("Agent communication");
        for (recipient, delivery) in &broadcast {
            print_delivery(&format!("insight → {recipient}"), delivery);
        }
        print_delivery(&format!("coordination → {STUDY}"), &coordination);
        render::detail("messages sent", ctx.bus.sent_count());
    }

    // 4. Check-ins as a long-running operation
    let operation = LongRunningOperation::new();
    let orchestrator = Arc::clone(&state.orchestrator);
    let check_in_user = user.to_string();
    operation.start(CHECK_INS.len() as u32, move |unit| {
        let orchestrator = Arc::clone(&orchestrator);
        let user = check_in_user.clone();
        async move {
            let entry = CHECK_INS.get(unit as usize).copied().unwrap_or_default();
            let request = AgentRequest::new(
                user,
                EMOTIONAL,
                AgentTask::Journal(JournalTask {
                    journal_entry: entry.to_string(),
                    emotion_tags: Vec::new(),
                }),
            );
            match orchestrator.process(request).await {
                AgentResponse::Completed(done) => Ok(json!({
                    "check_in": unit + 1,
                    "mood_score": done.mood_score,
                })),
                AgentResponse::Error(failure) => Err(failure.error),
            }
        }
    });
    let paused = operation.pause();
    let while_paused = operation.status();
    operation.resume();
    operation.wait().await;
    let finished = operation.status();
    if !json {
        render::heading("Check-in operation");
        if paused {
            render::detail("paused at", format!("{}%", while_paused.progress));
        }
        render::detail("status", &finished.status);
        render::detail("progress", format!("{}%", finished.progress));
        if let Some(error) = &finished.error {
            render::detail("error", style(error).red());
        }
    }

    // 5. Memory compaction summary
    let total_records = ctx
        .memory
        .history(user)
        .last()
        .map_or(0, |record| record.sequence_id);
    let compaction = ctx.memory.compact(user, DEMO_MEMORY_CAP);
    if !json {
        render::heading("Memory");
        render::detail("recorded", total_records);
        if compaction.compacted {
            render::detail(
                "compacted",
                format!(
                    "{} → {} (removed {})",
                    compaction.before.unwrap_or_default(),
                    compaction.after.unwrap_or_default(),
                    compaction.removed.unwrap_or_default()
                ),
            );
        } else {
            render::detail("compacted", "not needed");
        }
        render::detail("kept", ctx.memory.len(user));
        println!();
    }

    if json {
        summary.insert("emotional".to_string(), serde_json::to_value(&emotional)?);
        summary.insert("parallel".to_string(), serde_json::to_value(&parallel)?);
        summary.insert("broadcast".to_string(), serde_json::to_value(&broadcast)?);
        summary.insert("coordination".to_string(), serde_json::to_value(&coordination)?);
        summary.insert("operation".to_string(), serde_json::to_value(&finished)?);
        summary.insert("compaction".to_string(), serde_json::to_value(&compaction)?);
        summary.insert(
            "memory_records".to_string(),
            serde_json::to_value(ctx.memory.recent(user, DEMO_MEMORY_CAP))?,
        );
        render::print_json(&Value::Object(summary))?;
    }

    Ok(())
}

fn print_outcome(label: &str, outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::Completed(value) => {
            let agent = value.get("agent").and_then(Value::as_str).unwrap_or("?");
            let score = value
                .get("evaluation")
                .and_then(|e| e.get("score"))
                .and_then(Value::as_f64);
            let line = match score {
                Some(score) => format!("{label}: {agent} agent done (quality {score:.0}/100)"),
                None => format!("{label}: {agent} agent done"),
            };
            render::success(&line);
        }
        TaskOutcome::Failed { error } => render::failure(&format!("{label}: {error}")),
    }
}

fn print_delivery(label: &str, delivery: &DeliveryResult) {
    match delivery {
        DeliveryResult::Delivered { outcome, .. } => {
            render::success(&format!("{label}: {}", outcome.status()));
        }
        DeliveryResult::Queued { .. } => {
            render::failure(&format!("{label}: queued (agent not registered)"));
        }
        DeliveryResult::DeliveryFailed { error, .. } => {
            render::failure(&format!("{label}: {error}"));
        }
    }
}
