//! Derived quality signals for agent output.
//!
//! - `AgentEvaluator::evaluate` scores a response out of 100 from four
//!   25-point checks (length, empathetic vocabulary, structure, criteria).
//! - `AgentEvaluator::track` / `report` keep a per-agent metric history.
//! - `mood_score` maps an emotion word to a 1-10 mood estimate.
//! - `tone_check` counts supportive vs harmful indicator words.
//! - `clarity_check` flags long sentences and missing clarifying phrases;
//!   `simplify_wording` swaps a few formal words for plain ones.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use dashmap::DashMap;
use saathi_types::evaluation::{
    ClarityReport, Evaluation, Grade, MetricSummary, PerformanceReport, ToneReport, Trend,
};
use tracing::debug;

const EMPATHY_WORDS: &[&str] = &["understand", "support", "help"];

const POSITIVE_EMOTIONS: &[&str] = &["happy", "joy", "excited", "grateful", "peaceful", "content"];
const NEGATIVE_EMOTIONS: &[&str] = &[
    "sad",
    "angry",
    "anxious",
    "stressed",
    "frustrated",
    "overwhelmed",
];

const SUPPORTIVE_INDICATORS: &[&str] = &[
    "support",
    "understand",
    "care",
    "help",
    "listen",
    "empathy",
    "compassion",
    "growth",
    "healing",
    "resilience",
    "strength",
];
const HARMFUL_INDICATORS: &[&str] = &[
    "hate",
    "stupid",
    "worthless",
    "failure",
    "hopeless",
    "useless",
    "despair",
    "alone",
    "reject",
];

/// Longest average sentence, in words, that still reads as clear.
const MAX_AVG_SENTENCE_WORDS: f64 = 20.0;

const CLARIFYING_PHRASES: &[&str] = &[
    "specifically",
    "for example",
    "in other words",
    "to clarify",
    "this means that",
];

const ACTION_VERBS: &[&str] = &[
    "create", "plan", "organize", "schedule", "write", "reflect", "share",
];

const PLAIN_WORDS: &[(&str, &str)] = &[
    ("utilize", "use"),
    ("facilitate", "help"),
    ("implement", "do"),
    ("approximately", "about"),
    ("numerous", "many"),
];

/// Number of recent samples averaged in a performance report.
const REPORT_WINDOW: usize = 10;

/// Scores agent responses and tracks per-agent metrics.
#[derive(Default)]
pub struct AgentEvaluator {
    metrics: DashMap<String, HashMap<String, Vec<f64>>>,
}

impl AgentEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `response` out of 100 against the expected `criteria`.
    pub fn evaluate(&self, agent: &str, response: &str, criteria: &[&str]) -> Evaluation {
        let lowered = response.to_lowercase();
        let mut score = 0.0;
        let mut feedback = Vec::new();

        if response.trim().chars().count() > 10 {
            score += 25.0;
            feedback.push("Response has sufficient length".to_string());
        } else {
            feedback.push("Response too short".to_string());
        }

        if EMPATHY_WORDS.iter().any(|w| lowered.contains(w)) {
            score += 25.0;
            feedback.push("Response shows empathy".to_string());
        } else {
            feedback.push("Could use more empathetic language".to_string());
        }

        // Two or more sentence segments.
        if response.split('.').count() >= 2 {
            score += 25.0;
            feedback.push("Well-structured response".to_string());
        } else {
            feedback.push("Response structure could be improved".to_string());
        }

        let met = criteria
            .iter()
            .filter(|c| lowered.contains(&c.to_lowercase()))
            .count();
        if !criteria.is_empty() {
            score += met as f64 / criteria.len() as f64 * 25.0;
        }

        debug!(agent, score, "response evaluated");

        Evaluation {
            agent: agent.to_string(),
            score,
            grade: Grade::from_score(score),
            feedback,
            criteria_met: format!("{met}/{}", criteria.len()),
            evaluated_at: Utc::now(),
        }
    }

    /// Record one sample of `metric` for `agent`.
    pub fn track(&self, agent: &str, metric: &str, value: f64) {
        self.metrics
            .entry(agent.to_string())
            .or_default()
            .entry(metric.to_string())
            .or_default()
            .push(value);
        debug!(agent, metric, value, "performance tracked");
    }

    /// Summarize every tracked metric for `agent`, or `None` if it has none.
    pub fn report(&self, agent: &str) -> Option<PerformanceReport> {
        let entry = self.metrics.get(agent)?;

        let metrics = entry
            .iter()
            .filter_map(|(metric, values)| {
                let current = *values.last()?;
                let window = &values[values.len().saturating_sub(REPORT_WINDOW)..];
                let average = window.iter().sum::<f64>() / window.len() as f64;
                let trend = match values.len() {
                    n if n > 1 && current > values[n - 2] => Trend::Improving,
                    _ => Trend::Stable,
                };
                Some((
                    metric.clone(),
                    MetricSummary {
                        current,
                        average,
                        trend,
                    },
                ))
            })
            .collect::<BTreeMap<_, _>>();

        Some(PerformanceReport {
            agent: agent.to_string(),
            metrics,
        })
    }
}

impl std::fmt::Debug for AgentEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentEvaluator")
            .field("agents", &self.metrics.len())
            .finish()
    }
}

/// Estimate a 1-10 mood score from an emotion word.
pub fn mood_score(emotion: &str) -> u8 {
    let emotion = emotion.trim().to_lowercase();
    if POSITIVE_EMOTIONS.contains(&emotion.as_str()) {
        8
    } else if NEGATIVE_EMOTIONS.contains(&emotion.as_str()) {
        3
    } else {
        5
    }
}

/// Keyword tone check. Any harmful indicator makes the text invalid.
pub fn tone_check(text: &str) -> ToneReport {
    let lowered = text.to_lowercase();
    let positive = SUPPORTIVE_INDICATORS
        .iter()
        .filter(|w| lowered.contains(*w))
        .count();
    let negative = HARMFUL_INDICATORS
        .iter()
        .filter(|w| lowered.contains(*w))
        .count();

    let total = positive + negative;
    let score = if total > 0 {
        positive as f64 / total as f64
    } else {
        0.0
    };

    let mut feedback = Vec::new();
    if negative > 0 {
        feedback.push("Text contains potentially negative language".to_string());
    }
    if positive < 2 {
        feedback.push("Consider adding more empathetic language".to_string());
    }

    ToneReport {
        is_valid: negative == 0,
        score,
        feedback,
    }
}

/// Readability check: average sentence length, clarifying phrases, and
/// whether the text suggests anything to do.
///
/// Sentences are split on `". "`, so a text always has at least one.
pub fn clarity_check(text: &str) -> ClarityReport {
    let lowered = text.to_lowercase();
    let sentences = text.split(". ").count();
    let words = text.split_whitespace().count();
    let avg_sentence_words = words as f64 / sentences as f64;

    let mut complexity_issues = Vec::new();
    let mut suggestions = Vec::new();

    let is_clear = avg_sentence_words <= MAX_AVG_SENTENCE_WORDS;
    if !is_clear {
        complexity_issues.push(format!(
            "Average sentence length ({avg_sentence_words:.1}) is too high"
        ));
        suggestions.push("Break long sentences into shorter, clearer statements".to_string());
    }

    let clarifiers = CLARIFYING_PHRASES
        .iter()
        .filter(|p| lowered.contains(*p))
        .count();
    if clarifiers == 0 {
        suggestions.push("Add examples or clarifications to improve understanding".to_string());
    }
    if !ACTION_VERBS.iter().any(|v| lowered.contains(v)) {
        suggestions.push("Include actionable steps or suggestions".to_string());
    }

    ClarityReport {
        is_clear,
        readability_score: (clarifiers as f64 / 3.0).min(1.0),
        complexity_issues,
        suggestions,
    }
}

/// Replace a handful of formal words with plain equivalents.
pub fn simplify_wording(text: &str) -> String {
    PLAIN_WORDS
        .iter()
        .fold(text.to_string(), |acc, &(formal, plain)| acc.replace(formal, plain))
}
