//! Result persistence.
//!
//! Implements the `ResultStore` trait from `saathi-core` as timestamped JSON
//! files in a local directory.

pub mod json_store;

pub use json_store::JsonFileStore;
