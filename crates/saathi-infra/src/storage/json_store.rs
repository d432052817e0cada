//! JSON-file result store.
//!
//! Every saved record becomes one pretty-printed file:
//! ```text
//! {dir}/
//!   emotional_support_20260105_142233_123456.json
//!   study_planning_20260105_142240_004211.json
//! ```
//! with contents `{"timestamp": ..., "data": <record>}`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use saathi_core::storage::ResultStore;
use saathi_types::error::PersistenceError;
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Local directory-backed [`ResultStore`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store files under `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read back a saved file (the full `{timestamp, data}` wrapper).
    pub async fn load(&self, path: &Path) -> Result<Value, PersistenceError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PersistenceError::Io(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content).map_err(|e| PersistenceError::Serialize(e.to_string()))
    }

    /// Saved files for `category`, oldest first. A missing directory is
    /// treated as empty.
    pub async fn list(&self, category: &str) -> Result<Vec<PathBuf>, PersistenceError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::Io(e.to_string())),
        };

        let prefix = format!("{category}_");
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersistenceError::Io(e.to_string()))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            // "study" must not match "study_planning_...": the timestamp
            // directly follows the prefix.
            let matches = name.ends_with(".json")
                && name
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(|c| c.is_ascii_digit());
            if matches {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Create the file exclusively, adding a `_N` suffix when two saves land
    /// in the same microsecond.
    async fn create_unique(
        &self,
        stem: &str,
    ) -> Result<(PathBuf, tokio::fs::File), PersistenceError> {
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.json")
            } else {
                format!("{stem}_{attempt}.json")
            };
            let path = self.dir.join(name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(PersistenceError::Io(format!("{}: {e}", path.display())));
                }
            }
        }
    }
}

impl ResultStore for JsonFileStore {
    async fn save(&self, record: &Value, category: &str) -> Result<PathBuf, PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::Io(format!("{}: {e}", self.dir.display())))?;

        let now = Utc::now();
        let wrapped = json!({
            "timestamp": now.to_rfc3339(),
            "data": record,
        });
        let content = serde_json::to_string_pretty(&wrapped)
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;

        let stem = format!("{category}_{}", now.format(TIMESTAMP_FORMAT));
        let (path, mut file) = self.create_unique(&stem).await?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| PersistenceError::Io(format!("{}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| PersistenceError::Io(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), category, "result saved");
        Ok(path)
    }
}
