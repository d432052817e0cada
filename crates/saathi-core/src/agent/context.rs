//! Shared runtime context built once at start-up.

use std::sync::Arc;

use saathi_types::config::SaathiConfig;

use super::community::CommunityAgent;
use super::emotional::EmotionalSupportAgent;
use super::handle::BoxAgent;
use super::registry::AgentRegistry;
use super::social::SocialStoryAgent;
use super::study::StudyPlanningAgent;
use crate::evaluation::AgentEvaluator;
use crate::llm::BoxTextGenerator;
use crate::memory::MemoryStore;
use crate::message::MessageBus;
use crate::retry::RetryPolicy;

/// Registered name of the emotional support agent.
pub const EMOTIONAL: &str = "emotional";
/// Registered name of the study planning agent.
pub const STUDY: &str = "study";
/// Registered name of the community agent.
pub const COMMUNITY: &str = "community";
/// Registered name of the social storytelling agent.
pub const SOCIAL: &str = "social";

/// Everything the orchestrator and CLI share: configuration, the agent
/// registry, the message bus over that registry, per-user memory, and the
/// evaluator.
#[derive(Debug)]
pub struct SaathiContext {
    pub config: SaathiConfig,
    pub registry: Arc<AgentRegistry>,
    pub bus: Arc<MessageBus>,
    pub memory: Arc<MemoryStore>,
    pub evaluator: Arc<AgentEvaluator>,
}

impl SaathiContext {
    /// Build an empty context; no agents are registered yet.
    pub fn new(config: SaathiConfig) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let bus = Arc::new(MessageBus::new(Arc::clone(&registry)));
        Self {
            config,
            registry,
            bus,
            memory: Arc::new(MemoryStore::new()),
            evaluator: Arc::new(AgentEvaluator::new()),
        }
    }

    /// Register the built-in agents, all sharing `generator` and the
    /// configured retry policy.
    pub fn register_default_agents(&self, generator: Arc<BoxTextGenerator>) {
        let retry = RetryPolicy::from(&self.config.retry);
        self.registry.register(
            EMOTIONAL,
            BoxAgent::new(EmotionalSupportAgent::new(
                Arc::clone(&generator),
                retry.clone(),
            )),
        );
        self.registry.register(
            STUDY,
            BoxAgent::new(StudyPlanningAgent::new(
                Arc::clone(&generator),
                retry.clone(),
            )),
        );
        self.registry.register(
            COMMUNITY,
            BoxAgent::new(CommunityAgent::new(Arc::clone(&generator), retry.clone())),
        );
        self.registry.register(
            SOCIAL,
            BoxAgent::new(SocialStoryAgent::new(generator, retry)),
        );
    }
}
