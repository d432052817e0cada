//! Infrastructure layer for Agent Saathi.
//!
//! Contains implementations of the ports defined in `saathi-core`: the
//! Gemini text generator, the JSON-file result store, configuration loading
//! from the data directory, and credential lookup.

pub mod config;
pub mod llm;
pub mod secret;
pub mod storage;
