//! Shared domain types for Agent Saathi.
//!
//! This crate contains the data shapes passed between the other crates:
//! A2A message envelopes and delivery results, agent task shapes, memory
//! records, long-running operation snapshots, configuration, and the error
//! enums for each layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod memory;
pub mod message;
pub mod operation;
pub mod request;
pub mod task;
