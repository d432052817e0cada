//! Configuration loader for Agent Saathi.
//!
//! Reads `config.toml` (from the data directory, `~/.saathi/` in production,
//! or an explicit path) and deserializes it into [`SaathiConfig`]. Falls back
//! to defaults when the file is missing or malformed, then applies the
//! `SAATHI_MODEL` / `SAATHI_DATA_DIR` environment overrides.

use std::path::{Path, PathBuf};

use saathi_types::config::SaathiConfig;

/// Overrides the configured model name.
pub const MODEL_ENV: &str = "SAATHI_MODEL";
/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "SAATHI_DATA_DIR";

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DIR_NAME: &str = ".saathi";

/// `~/.saathi`, or `./.saathi` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Location of `config.toml` inside `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`SaathiConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
pub async fn load_config(path: &Path) -> SaathiConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return SaathiConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return SaathiConfig::default();
        }
    };

    match toml::from_str::<SaathiConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            SaathiConfig::default()
        }
    }
}

/// Apply explicit overrides. Blank values are ignored.
pub fn apply_overrides(
    config: &mut SaathiConfig,
    model: Option<String>,
    data_dir: Option<PathBuf>,
) {
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        tracing::debug!(%model, "model overridden");
        config.model = model;
    }
    if let Some(dir) = data_dir.filter(|d| !d.as_os_str().is_empty()) {
        config.data_dir = Some(dir);
    }
}

/// Apply `SAATHI_MODEL` / `SAATHI_DATA_DIR` from the process environment.
pub fn apply_env_overrides(config: &mut SaathiConfig) {
    apply_overrides(
        config,
        std::env::var(MODEL_ENV).ok(),
        std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
    );
}

/// Data directory before any config is read: `SAATHI_DATA_DIR`, then the
/// default.
pub fn initial_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_data_dir)
}

/// Effective data directory: the configured one, then the default.
pub fn resolve_data_dir(config: &SaathiConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(default_data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&config_path(tmp.path())).await;
        assert_eq!(config, SaathiConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        tokio::fs::write(
            &path,
            r#"
model = "gemini-2.5-pro"

[memory]
max_entries = 8

[parallel]
max_concurrency = 2
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.memory.max_entries, 8);
        assert_eq!(config.parallel.max_concurrency, 2);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = config_path(tmp.path());
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config, SaathiConfig::default());
    }

    #[test]
    fn overrides_replace_model_and_data_dir() {
        let mut config = SaathiConfig::default();
        apply_overrides(
            &mut config,
            Some("gemini-2.5-flash".to_string()),
            Some(PathBuf::from("/tmp/saathi")),
        );
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(resolve_data_dir(&config), PathBuf::from("/tmp/saathi"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = SaathiConfig::default();
        apply_overrides(&mut config, Some("  ".to_string()), Some(PathBuf::new()));
        assert_eq!(config, SaathiConfig::default());
    }

    #[test]
    fn data_dir_defaults_under_home() {
        let config = SaathiConfig::default();
        assert!(resolve_data_dir(&config).ends_with(DEFAULT_DIR_NAME));
    }
}
