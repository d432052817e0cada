//! Agent kinds and the task shapes agents accept.
//!
//! Routing is content based: a task-request payload carries a `task` object
//! whose *shape* (which identifying fields are present) decides the
//! `TaskKind`. One object can fit several shapes; each agent declares the
//! kinds it supports, and the bus dispatches the first shape on that list.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::message::Payload;

/// The agent variants that can be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    EmotionalSupport,
    StudyPlanning,
    Community,
    SocialMedia,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::EmotionalSupport => write!(f, "emotional_support"),
            AgentKind::StudyPlanning => write!(f, "study_planning"),
            AgentKind::Community => write!(f, "community"),
            AgentKind::SocialMedia => write!(f, "social_media"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "emotional_support" => Ok(AgentKind::EmotionalSupport),
            "study_planning" => Ok(AgentKind::StudyPlanning),
            "community" => Ok(AgentKind::Community),
            "social_media" => Ok(AgentKind::SocialMedia),
            other => Err(format!("invalid agent kind: '{other}'")),
        }
    }
}

/// The kind of a task, derived from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Journal,
    StudyPlan,
    CommunityIssues,
    CommunityProject,
    InspirationalStory,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Journal => write!(f, "journal"),
            TaskKind::StudyPlan => write!(f, "study_plan"),
            TaskKind::CommunityIssues => write!(f, "community_issues"),
            TaskKind::CommunityProject => write!(f, "community_project"),
            TaskKind::InspirationalStory => write!(f, "inspirational_story"),
        }
    }
}

/// A journal entry to reflect on, with optional emotion tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTask {
    #[serde(alias = "journalEntry")]
    pub journal_entry: String,
    #[serde(default, alias = "emotionTags", deserialize_with = "null_as_default")]
    pub emotion_tags: Vec<String>,
}

/// Subjects to build a weekly study plan for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanTask {
    pub subjects: Vec<String>,
    #[serde(
        default = "default_available_hours",
        alias = "availableHours",
        deserialize_with = "hours_or_default"
    )]
    pub available_hours: u32,
    #[serde(default = "default_deadline", deserialize_with = "deadline_or_default")]
    pub deadline: String,
    #[serde(
        default = "default_learning_style",
        alias = "learningStyle",
        deserialize_with = "learning_style_or_default"
    )]
    pub learning_style: String,
}

impl StudyPlanTask {
    /// A plan request with the default hours, deadline, and style.
    pub fn new(subjects: Vec<String>) -> Self {
        Self {
            subjects,
            available_hours: default_available_hours(),
            deadline: default_deadline(),
            learning_style: default_learning_style(),
        }
    }
}

/// A location and the needs its community has expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityTask {
    pub location: String,
    #[serde(alias = "communityNeeds", deserialize_with = "null_as_default")]
    pub community_needs: Vec<String>,
}

/// An issue to plan a volunteer-run community project around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityProjectTask {
    pub issue: String,
    #[serde(
        default,
        alias = "availableResources",
        deserialize_with = "null_as_default"
    )]
    pub available_resources: Vec<String>,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub volunteers: u32,
    #[serde(default = "default_timeline", deserialize_with = "timeline_or_default")]
    pub timeline: String,
}

/// A personal experience to retell as an inspirational story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTask {
    pub experience: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transformation: String,
    #[serde(default, alias = "lessonLearned", deserialize_with = "null_as_default")]
    pub lesson_learned: String,
    #[serde(
        default = "default_emotional_tone",
        alias = "emotionalTone",
        deserialize_with = "tone_or_default"
    )]
    pub emotional_tone: String,
}

fn default_available_hours() -> u32 {
    10
}

fn default_deadline() -> String {
    "4 weeks".to_string()
}

fn default_learning_style() -> String {
    "visual".to_string()
}

fn default_timeline() -> String {
    "1 month".to_string()
}

fn default_emotional_tone() -> String {
    "hopeful".to_string()
}

/// `null` reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON number, rounded to the nearest whole value and clamped to `u32`.
fn whole_number(value: f64) -> u32 {
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

fn hours_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or_else(default_available_hours, whole_number))
}

fn count_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0, whole_number))
}

fn deadline_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_deadline))
}

fn learning_style_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_learning_style))
}

fn timeline_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_timeline))
}

fn tone_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_emotional_tone))
}

/// A unit of work for an agent.
///
/// Serialized as the bare task object. Reading one back goes through
/// [`AgentTask::candidates`], so extra fields never hide a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AgentTask {
    Journal(JournalTask),
    StudyPlan(StudyPlanTask),
    CommunityIssues(CommunityTask),
    CommunityProject(CommunityProjectTask),
    InspirationalStory(StoryTask),
}

fn has_any(object: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| object.contains_key(*key))
}

fn read<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

impl AgentTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            AgentTask::Journal(_) => TaskKind::Journal,
            AgentTask::StudyPlan(_) => TaskKind::StudyPlan,
            AgentTask::CommunityIssues(_) => TaskKind::CommunityIssues,
            AgentTask::CommunityProject(_) => TaskKind::CommunityProject,
            AgentTask::InspirationalStory(_) => TaskKind::InspirationalStory,
        }
    }

    /// Every task a raw object can be read as.
    ///
    /// Each shape is keyed on the field that identifies it; a shape is a
    /// candidate when that key is present and the rest of the object reads
    /// cleanly into it. Unrelated fields are ignored.
    pub fn candidates(value: &Value) -> Vec<Self> {
        let Some(object) = value.as_object() else {
            return Vec::new();
        };

        let mut found = Vec::new();
        if has_any(object, &["journal_entry", "journalEntry"]) {
            found.extend(read(value).map(AgentTask::Journal));
        }
        if object.contains_key("subjects") {
            found.extend(read(value).map(AgentTask::StudyPlan));
        }
        if object.contains_key("location")
            && has_any(object, &["community_needs", "communityNeeds"])
        {
            found.extend(read(value).map(AgentTask::CommunityIssues));
        }
        if object.contains_key("issue") {
            found.extend(read(value).map(AgentTask::CommunityProject));
        }
        if object.contains_key("experience") {
            found.extend(read(value).map(AgentTask::InspirationalStory));
        }
        found
    }

    /// The first candidate shape, if any.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::candidates(value).into_iter().next()
    }

    /// The first candidate shape whose kind is in `accepted`.
    pub fn matching(value: &Value, accepted: &[TaskKind]) -> Option<Self> {
        Self::candidates(value)
            .into_iter()
            .find(|task| accepted.contains(&task.kind()))
    }

    /// Extract the task from a task-request payload's `task` member.
    pub fn from_payload(payload: &Payload) -> Option<Self> {
        payload.get("task").and_then(Self::from_value)
    }

    /// Build a task-request payload (`{"task": {...}}`) for this task.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert(
            "task".to_string(),
            serde_json::to_value(self).unwrap_or(Value::Null),
        );
        payload
    }
}

impl<'de> Deserialize<'de> for AgentTask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| de::Error::custom("task matches no known shape"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
