//! Social storytelling agent: turns a personal experience into an
//! inspirational story with ready-to-post platform variants.

use std::collections::BTreeMap;
use std::sync::Arc;

use saathi_types::agent::{AgentKind, AgentTask, StoryTask, TaskKind};
use saathi_types::error::AgentError;
use serde_json::{Value, json};
use tracing::warn;

use super::handle::Agent;
use super::prompt::{build_prompt, generate_checked};
use crate::evaluation::tone_check;
use crate::llm::BoxTextGenerator;
use crate::retry::RetryPolicy;

const ROLE: &str = "You are Agent Saathi, a compassionate storyteller and community \
connector. Create authentic social media content that inspires, connects, and drives \
positive social change through emotional storytelling. Lead with empathy, highlight human \
experiences, show transformation and growth, and build community through shared stories.";

const INSTRUCTIONS: &str = "Craft a narrative that connects emotionally with the audience, \
shows authentic struggle and growth, provides hope, encourages sharing and reflection, and \
ends with a meaningful call to action. Make it personal, relatable, and uplifting.";

pub const FALLBACK_STORY: &str = "Every journey begins with a single step. Your experiences \
matter, your growth inspires, and your story can light the way for others.";

/// Platform name and its post length limit in characters.
const PLATFORMS: &[(&str, usize)] = &[("twitter", 280), ("linkedin", 1300), ("instagram", 2200)];

const HASHTAGS: &str = "#EmpathyTech #AIForGood #AgentSaathi";

/// One post per platform: `content` cut to roughly the platform's length
/// (six characters per word) followed by the hashtags.
pub(crate) fn social_posts(content: &str) -> BTreeMap<&'static str, String> {
    PLATFORMS
        .iter()
        .map(|&(platform, max_chars)| {
            let words: Vec<&str> = content.split_whitespace().collect();
            let max_words = max_chars / 6;
            let body = if words.len() > max_words {
                format!("{}...", words[..max_words].join(" "))
            } else {
                content.to_string()
            };
            (platform, format!("{body}\n\n{HASHTAGS}"))
        })
        .collect()
}

pub struct SocialStoryAgent {
    generator: Arc<BoxTextGenerator>,
    retry: RetryPolicy,
}

impl SocialStoryAgent {
    pub fn new(generator: Arc<BoxTextGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }

    async fn tell(&self, task: &StoryTask) -> Result<Value, AgentError> {
        if task.experience.trim().is_empty() {
            return Err(AgentError::InvalidTask("experience is empty".to_string()));
        }

        let or_unspecified = |text: &str| {
            if text.trim().is_empty() {
                "Not specified".to_string()
            } else {
                text.to_string()
            }
        };
        let prompt = build_prompt(
            ROLE,
            &[
                ("experience", task.experience.clone()),
                ("transformation", or_unspecified(&task.transformation)),
                ("lesson_learned", or_unspecified(&task.lesson_learned)),
                ("emotional_tone", task.emotional_tone.clone()),
            ],
            INSTRUCTIONS,
        );

        let story = match generate_checked(&self.generator, &self.retry, &prompt, |text| {
            !text.trim().is_empty() && tone_check(text).is_valid
        })
        .await
        {
            Ok(story) => story,
            Err(e) => {
                warn!(error = %e, "story creation failed, using fallback");
                return Ok(json!({
                    "error": format!("Story creation failed: {e}"),
                    "fallback_story": FALLBACK_STORY,
                }));
            }
        };

        Ok(json!({
            "social_posts": social_posts(&story),
            "tone_validation": tone_check(&story),
            "full_story": story,
            "emotional_tone": task.emotional_tone,
        }))
    }
}

impl Agent for SocialStoryAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::SocialMedia
    }

    fn capabilities(&self) -> &'static [TaskKind] {
        &[TaskKind::InspirationalStory]
    }

    fn insight_field(&self, _task: TaskKind) -> &'static str {
        "full_story"
    }

    fn criteria(&self) -> &'static [&'static str] {
        &["journey", "growth", "hope"]
    }

    async fn handle(&self, task: &AgentTask) -> Result<Value, AgentError> {
        match task {
            AgentTask::InspirationalStory(story) => self.tell(story).await,
            other => Err(AgentError::Unsupported(other.kind())),
        }
    }
}
