//! Business logic for Agent Saathi.
//!
//! This crate defines the agents, the in-process A2A message bus, the
//! per-user memory store, the parallel task runner, long-running
//! operations, and the orchestrator that composes them. It also defines the
//! "ports" the infrastructure layer implements (`TextGenerator`,
//! `ResultStore`). It depends only on `saathi-types` -- never on
//! `saathi-infra` or any network/IO crate.

pub mod agent;
pub mod evaluation;
pub mod llm;
pub mod memory;
pub mod message;
pub mod operation;
pub mod parallel;
pub mod retry;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
