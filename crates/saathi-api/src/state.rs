//! Application state wiring the context, agents, and result store together.
//!
//! `AppState` pins the generic `Orchestrator` to the concrete
//! [`JsonFileStore`] and owns the resolved data directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use saathi_core::agent::{Orchestrator, SaathiContext};
use saathi_core::llm::BoxTextGenerator;
use saathi_infra::config::{
    apply_env_overrides, config_path, initial_data_dir, load_config, resolve_data_dir,
};
use saathi_infra::storage::JsonFileStore;
use saathi_types::config::SaathiConfig;

pub type ConcreteOrchestrator = Orchestrator<JsonFileStore>;

/// Directory under the data dir that receives saved results.
const RESULTS_DIR: &str = "results";

/// Configuration resolved from the config file and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: SaathiConfig,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Settings {
    /// Read `config.toml` (from `explicit` or the data directory), then
    /// apply the environment overrides.
    pub async fn load(explicit: Option<&Path>) -> Self {
        let config_path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_path(&initial_data_dir()));
        let mut config = load_config(&config_path).await;
        apply_env_overrides(&mut config);
        let data_dir = resolve_data_dir(&config);
        Self {
            config,
            data_dir,
            config_path,
        }
    }
}

/// Shared application state used by every command.
pub struct AppState {
    pub settings: Settings,
    pub orchestrator: Arc<ConcreteOrchestrator>,
    /// Whether the default agents are registered (the credential was found).
    pub agents_ready: bool,
}

impl AppState {
    /// Build the state. Agents are registered only when a generator is given.
    pub fn new(settings: Settings, generator: Option<BoxTextGenerator>) -> Self {
        let ctx = SaathiContext::new(settings.config.clone());
        let agents_ready = generator.is_some();
        if let Some(generator) = generator {
            ctx.register_default_agents(Arc::new(generator));
        }
        let store = JsonFileStore::new(settings.data_dir.join(RESULTS_DIR));
        let orchestrator = Arc::new(Orchestrator::new(Arc::new(ctx), store));
        Self {
            settings,
            orchestrator,
            agents_ready,
        }
    }

    pub fn context(&self) -> &Arc<SaathiContext> {
        self.orchestrator.context()
    }

    pub fn results_dir(&self) -> PathBuf {
        self.settings.data_dir.join(RESULTS_DIR)
    }
}
