//! Credential lookup.
//!
//! - `env`: reads the generation API key from the process environment

pub mod env;

pub use env::google_api_key;
