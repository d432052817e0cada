//! Per-user memory.
//!
//! `MemoryStore` keeps an append-only log per user and compacts it to a
//! fixed cap, keeping only the most recent records.

pub mod store;

pub use store::MemoryStore;
