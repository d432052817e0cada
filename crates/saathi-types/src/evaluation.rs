//! Response quality evaluation, tone, and clarity report types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Letter grade for an evaluation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
}

impl Grade {
    /// A at 80 and above, B at 60 and above, C otherwise.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Grade::A
        } else if score >= 60.0 {
            Grade::B
        } else {
            Grade::C
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
        }
    }
}

/// Quality evaluation of one agent response (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub agent: String,
    pub score: f64,
    pub grade: Grade,
    pub feedback: Vec<String>,
    /// `"met/total"` for the expected criteria.
    pub criteria_met: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Keyword-based tone check of generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneReport {
    pub is_valid: bool,
    /// Share of positive indicators among all indicators found (0.0-1.0).
    pub score: f64,
    pub feedback: Vec<String>,
}

/// Readability check of generated guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarityReport {
    /// False when sentences average more than twenty words.
    pub is_clear: bool,
    /// Clarifying phrases found, over three, capped at 1.0.
    pub readability_score: f64,
    pub complexity_issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Direction of a tracked metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
}

/// Summary of one tracked metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub current: f64,
    /// Mean over the last ten samples.
    pub average: f64,
    pub trend: Trend,
}

/// Per-agent performance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub agent: String,
    pub metrics: std::collections::BTreeMap<String, MetricSummary>,
}
