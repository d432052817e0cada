//! Agents and the components that compose them.
//!
//! - `handle`: the `Agent` trait and the type-erased `BoxAgent`
//! - `registry`: name -> agent lookup
//! - `emotional`, `study`, `community`, `social`: the built-in agents
//! - `context`: `SaathiContext`, the shared runtime built once at start-up
//! - `orchestrator`: request handling across agents, memory, and storage

pub mod community;
pub mod context;
pub mod emotional;
pub mod handle;
pub mod orchestrator;
pub(crate) mod prompt;
pub mod registry;
pub mod social;
pub mod study;

pub use community::CommunityAgent;
pub use context::SaathiContext;
pub use emotional::EmotionalSupportAgent;
pub use handle::{Agent, BoxAgent};
pub use orchestrator::Orchestrator;
pub use registry::AgentRegistry;
pub use social::SocialStoryAgent;
pub use study::StudyPlanningAgent;
