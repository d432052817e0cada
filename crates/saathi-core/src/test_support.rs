//! Test doubles shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use saathi_types::error::PersistenceError;
use saathi_types::llm::GenerationError;
use serde_json::Value;

use crate::llm::{BoxTextGenerator, TextGenerator};
use crate::storage::ResultStore;

/// Replays scripted replies, then repeats `default_reply` forever.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    default_reply: String,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    pub fn always(reply: &str) -> Self {
        Self::new(Vec::new(), reply)
    }

    pub fn new(replies: Vec<Result<String, GenerationError>>, default_reply: &str) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            default_reply: default_reply.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the generator is boxed.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.default_reply.clone()))
    }
}

/// A generator that always fails.
pub struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Provider {
            message: "backend unavailable".to_string(),
        })
    }
}

pub const SUPPORTIVE_REPLY: &str = "I understand how heavy exams can feel. \
    Your feelings are valid and I am here to support you. \
    Try a short walk and a good night of sleep.";

pub fn supportive_generator() -> Arc<BoxTextGenerator> {
    Arc::new(BoxTextGenerator::new(ScriptedGenerator::always(SUPPORTIVE_REPLY)))
}

pub fn failing_generator() -> Arc<BoxTextGenerator> {
    Arc::new(BoxTextGenerator::new(FailingGenerator))
}

/// Records every saved result in memory.
#[derive(Default, Clone)]
pub struct RecordingStore {
    pub saved: Arc<Mutex<Vec<(String, Value)>>>,
}

impl ResultStore for RecordingStore {
    async fn save(&self, record: &Value, category: &str) -> Result<PathBuf, PersistenceError> {
        let mut saved = self.saved.lock().unwrap();
        saved.push((category.to_string(), record.clone()));
        Ok(PathBuf::from(format!("memory/{category}_{}.json", saved.len())))
    }
}

/// A store whose writes always fail.
pub struct BrokenStore;

impl ResultStore for BrokenStore {
    async fn save(&self, _record: &Value, _category: &str) -> Result<PathBuf, PersistenceError> {
        Err(PersistenceError::Io("disk full".to_string()))
    }
}
