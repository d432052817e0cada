//! Text-generation implementations.
//!
//! Contains concrete implementations of the [`TextGenerator`] trait defined
//! in `saathi-core`, and a factory that builds the configured generator.
//!
//! [`TextGenerator`]: saathi_core::llm::TextGenerator

pub mod gemini;

use std::time::Duration;

use saathi_core::llm::BoxTextGenerator;
use saathi_types::config::SaathiConfig;
use saathi_types::llm::GenerationError;
use secrecy::SecretString;

use self::gemini::GeminiGenerator;

/// Build the generator described by `config`, type-erased for sharing
/// between agents.
pub fn create_generator(
    api_key: SecretString,
    config: &SaathiConfig,
) -> Result<BoxTextGenerator, GenerationError> {
    let generator = GeminiGenerator::new(
        api_key,
        config.model.clone(),
        Duration::from_secs(config.generation.timeout_secs),
    )?;
    tracing::info!(model = %config.model, "text generator ready");
    Ok(BoxTextGenerator::new(generator))
}
