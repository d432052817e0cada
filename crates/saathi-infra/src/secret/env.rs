//! Environment variable credential provider.
//!
//! The generation API key is read once at start-up and wrapped in a
//! [`SecretString`] so it never reaches `Debug` output or logs.

use saathi_types::error::ConfigError;
use secrecy::SecretString;

/// Environment variable holding the Gemini API key.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Read `GOOGLE_API_KEY`.
///
/// A missing, blank, or non-Unicode value is reported as
/// [`ConfigError::MissingCredential`].
pub fn google_api_key() -> Result<SecretString, ConfigError> {
    secret_from(GOOGLE_API_KEY, std::env::var(GOOGLE_API_KEY).ok())
}

fn secret_from(name: &str, value: Option<String>) -> Result<SecretString, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
        _ => Err(ConfigError::MissingCredential(name.to_string())),
    }
}
