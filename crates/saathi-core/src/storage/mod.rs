//! Result persistence port.
//!
//! Defines the `ResultStore` trait the orchestrator writes merged agent
//! results through. Implementations live in saathi-infra.

pub mod result_store;

pub use result_store::ResultStore;
