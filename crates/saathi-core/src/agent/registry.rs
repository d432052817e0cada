//! Name -> agent lookup shared by the bus and the orchestrator.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::handle::BoxAgent;

/// Registered agents keyed by name. One handle per name; re-registration
/// replaces the previous handle.
#[derive(Default)]
pub struct AgentRegistry {
    agents: DashMap<String, Arc<BoxAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, agent: BoxAgent) {
        let name = name.into();
        let replaced = self.agents.insert(name.clone(), Arc::new(agent)).is_some();
        debug!(agent = %name, replaced, "agent registered");
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<BoxAgent>> {
        self.agents.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}
