//! ResultStore trait definition.

use std::path::PathBuf;

use saathi_types::error::PersistenceError;
use serde_json::Value;

/// Trait for persisting agent results.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ResultStore: Send + Sync {
    /// Persist `record` under `category` and return where it was written.
    fn save(
        &self,
        record: &Value,
        category: &str,
    ) -> impl std::future::Future<Output = Result<PathBuf, PersistenceError>> + Send;
}
