//! In-memory per-user log with cap-based compaction.

use chrono::Utc;
use dashmap::DashMap;
use saathi_types::memory::{CompactionReport, MemoryRecord};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct UserLog {
    /// Last sequence id handed out; survives compaction.
    last_sequence: u64,
    records: Vec<MemoryRecord>,
}

/// Append-only memory logs keyed by user id.
///
/// Each mutation holds the user's map shard for its whole duration, so
/// appends and compactions for one user never interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, UserLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `payload` to `user_id`'s log, creating the log if needed.
    pub fn append(&self, user_id: &str, payload: Value) -> MemoryRecord {
        let mut log = self.users.entry(user_id.to_string()).or_default();
        log.last_sequence += 1;
        let record = MemoryRecord {
            sequence_id: log.last_sequence,
            stored_at: Utc::now(),
            payload,
        };
        log.records.push(record.clone());
        debug!(user_id, sequence_id = record.sequence_id, "memory appended");
        record
    }

    /// Keep only the most recent `max_entries` records for `user_id`.
    pub fn compact(&self, user_id: &str, max_entries: usize) -> CompactionReport {
        let Some(mut log) = self.users.get_mut(user_id) else {
            return CompactionReport::not_needed();
        };

        let before = log.records.len();
        if before <= max_entries {
            return CompactionReport::not_needed();
        }

        log.records = log.records.split_off(before - max_entries);
        let after = log.records.len();
        info!(user_id, before, after, "memory compacted");
        CompactionReport::compacted(before, after)
    }

    /// Append then compact, as the orchestrator does after every result.
    pub fn append_and_compact(
        &self,
        user_id: &str,
        payload: Value,
        max_entries: usize,
    ) -> (MemoryRecord, CompactionReport) {
        let record = self.append(user_id, payload);
        let report = self.compact(user_id, max_entries);
        (record, report)
    }

    /// All records for `user_id`, oldest first. Empty for unknown users.
    pub fn history(&self, user_id: &str) -> Vec<MemoryRecord> {
        self.users
            .get(user_id)
            .map(|log| log.records.clone())
            .unwrap_or_default()
    }

    /// The last `n` records for `user_id`, oldest first.
    pub fn recent(&self, user_id: &str, n: usize) -> Vec<MemoryRecord> {
        self.users
            .get(user_id)
            .map(|log| {
                let start = log.records.len().saturating_sub(n);
                log.records[start..].to_vec()
            })
            .unwrap_or_default()
    }

    pub fn len(&self, user_id: &str) -> usize {
        self.users.get(user_id).map_or(0, |log| log.records.len())
    }

    /// Known user ids, sorted.
    pub fn users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.users.iter().map(|e| e.key().clone()).collect();
        users.sort();
        users
    }
}
