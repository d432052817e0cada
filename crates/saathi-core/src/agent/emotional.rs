//! Emotional support agent: reflects on journal entries.

use std::sync::Arc;

use saathi_types::agent::{AgentKind, AgentTask, JournalTask, TaskKind};
use saathi_types::error::AgentError;
use serde_json::{Value, json};
use tracing::warn;

use super::handle::Agent;
use super::prompt::{build_prompt, generate_checked};
use crate::evaluation::{mood_score, tone_check};
use crate::llm::BoxTextGenerator;
use crate::retry::RetryPolicy;

const ROLE: &str = "You are Agent Saathi, a compassionate emotional support companion. \
Offer empathetic listening, emotional insight, and gentle guidance with warmth and \
practical support.";

const INSTRUCTIONS: &str = "Respond warmly with emotional validation, gentle insights, \
practical self-care suggestions, and a supportive closing. Keep it under 150 words.";

pub const FALLBACK_MESSAGE: &str = "I'm here to listen and support you. Your feelings are \
valid and important. Take a deep breath and remember to be kind to yourself today.";

pub struct EmotionalSupportAgent {
    generator: Arc<BoxTextGenerator>,
    retry: RetryPolicy,
}

impl EmotionalSupportAgent {
    pub fn new(generator: Arc<BoxTextGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }

    async fn reflect(&self, task: &JournalTask) -> Result<Value, AgentError> {
        if task.journal_entry.trim().is_empty() {
            return Err(AgentError::InvalidTask("journal entry is empty".to_string()));
        }

        let emotions = if task.emotion_tags.is_empty() {
            "Not specified".to_string()
        } else {
            task.emotion_tags.join(", ")
        };
        let prompt = build_prompt(
            ROLE,
            &[
                ("journal_entry", task.journal_entry.clone()),
                ("emotions", emotions),
            ],
            INSTRUCTIONS,
        );

        let insight =
            match generate_checked(&self.generator, &self.retry, &prompt, |text| {
                tone_check(text).is_valid
            })
            .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "emotional reflection failed, using fallback");
                    return Ok(json!({
                        "error": format!("Emotional processing failed: {e}"),
                        "fallback_message": FALLBACK_MESSAGE,
                    }));
                }
            };

        let primary_emotion = task
            .emotion_tags
            .first()
            .map(String::as_str)
            .unwrap_or("reflective");

        Ok(json!({
            "emotional_insight": insight,
            "primary_emotion": primary_emotion,
            "mood_score": mood_score(primary_emotion),
            "validation": {
                "tone": tone_check(&insight),
            },
        }))
    }
}

impl Agent for EmotionalSupportAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::EmotionalSupport
    }

    fn capabilities(&self) -> &'static [TaskKind] {
        &[TaskKind::Journal]
    }

    fn insight_field(&self, _task: TaskKind) -> &'static str {
        "emotional_insight"
    }

    fn criteria(&self) -> &'static [&'static str] {
        &["feel", "valid", "support"]
    }

    async fn handle(&self, task: &AgentTask) -> Result<Value, AgentError> {
        match task {
            AgentTask::Journal(journal) => self.reflect(journal).await,
            other => Err(AgentError::Unsupported(other.kind())),
        }
    }
}
