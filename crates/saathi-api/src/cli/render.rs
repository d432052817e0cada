//! Styled terminal output shared by the request and demo commands.

use anyhow::Result;
use console::style;
use serde::Serialize;

use saathi_types::request::{AgentResponse, CompletedResponse, ErrorResponse};

/// Result fields that hold the agent's main text, in lookup order.
const TEXT_FIELDS: &[&str] = &[
    "emotional_insight",
    "study_plan",
    "issue_analysis",
    "project_plan",
    "full_story",
    "fallback_message",
    "fallback_advice",
    "fallback_plan",
    "fallback_story",
];

/// Widest excerpt printed for a long agent reply.
const EXCERPT_CHARS: usize = 600;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn heading(text: &str) {
    println!();
    println!("  {}", style(format!("── {text} ──")).dim());
}

pub fn success(text: &str) {
    println!("  {} {text}", style("✓").green());
}

pub fn failure(text: &str) {
    println!("  {} {text}", style("✗").red());
}

pub fn detail(label: &str, value: impl std::fmt::Display) {
    println!("    {:<14} {value}", style(label).dim());
}

/// Print a full response: status line, derived signals, and the reply text.
pub fn response(resp: &AgentResponse) {
    match resp {
        AgentResponse::Completed(done) => completed(done),
        AgentResponse::Error(err) => error(err),
    }
}

fn completed(done: &CompletedResponse) {
    success(&format!(
        "{} agent responded ({})",
        style(&done.agent).cyan(),
        done.agent_type
    ));
    if let Some(error) = done.result.get("error").and_then(|v| v.as_str()) {
        detail("degraded", style(error).yellow());
    }
    if let Some(eval) = &done.evaluation {
        detail(
            "quality",
            format!("{:.0}/100 (grade {})", eval.score, eval.grade),
        );
    }
    if let Some(mood) = done.mood_score {
        detail("mood", format!("{mood}/10"));
    }
    detail("memory", format!("{} record(s)", done.memory_size));
    if let Some(path) = &done.saved_path {
        detail("saved", style(path.display()).dim());
    }
    if !done.shared_with.is_empty() {
        detail("shared with", done.shared_with.join(", "));
    }

    if let Some(text) = TEXT_FIELDS
        .iter()
        .find_map(|field| done.result.get(*field).and_then(|v| v.as_str()))
    {
        println!();
        for line in excerpt(text, EXCERPT_CHARS).lines() {
            println!("    {line}");
        }
    }
}

fn error(err: &ErrorResponse) {
    failure(&format!("{} ({})", style(&err.error).red(), err.agent_type));
    if !err.available_agents.is_empty() {
        detail("available", err.available_agents.join(", "));
    }
    detail("hint", &err.fallback_message);
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
