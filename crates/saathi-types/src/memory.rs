//! Per-user memory records and compaction reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry in a user's memory log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Per-user counter, starting at 1. Never reused, even after compaction.
    pub sequence_id: u64,
    pub stored_at: DateTime<Utc>,
    pub payload: Value,
}

/// Why a compaction request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactionSkip {
    NoCompactionNeeded,
}

/// Outcome of compacting a user's memory log to a cap.
///
/// Serializes as `{compacted: true, before, after, removed}` or
/// `{compacted: false, reason: "no_compaction_needed"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionReport {
    pub compacted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<CompactionSkip>,
}

impl CompactionReport {
    pub fn compacted(before: usize, after: usize) -> Self {
        Self {
            compacted: true,
            before: Some(before),
            after: Some(after),
            removed: Some(before.saturating_sub(after)),
            reason: None,
        }
    }

    pub fn not_needed() -> Self {
        Self {
            compacted: false,
            before: None,
            after: None,
            removed: None,
            reason: Some(CompactionSkip::NoCompactionNeeded),
        }
    }
}
