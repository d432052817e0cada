//! Configuration types for Agent Saathi.
//!
//! `SaathiConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty or missing file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaathiConfig {
    /// Text-generation model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the data directory (results and config live here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for SaathiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            data_dir: None,
            memory: MemoryConfig::default(),
            parallel: ParallelConfig::default(),
            retry: RetryConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Memory compaction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Records kept per user after each compaction.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    15
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

/// Parallel task runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Deadline applied to every task.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_task_timeout_secs() -> u64 {
    120
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }
}

/// Delay growth between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    Fixed,
    Exponential,
}

/// Retry settings for generation calls whose result fails a quality check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff")]
    pub backoff: Backoff,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_backoff() -> Backoff {
    Backoff::Exponential
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff: default_backoff(),
        }
    }
}

/// Text-generation client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generation_timeout_secs() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}
