//! Text-generation abstractions.
//!
//! - `TextGenerator`: RPITIT trait for concrete generation backends
//! - `BoxTextGenerator`: object-safe wrapper for dynamic dispatch

pub mod box_generator;
pub mod generator;

pub use box_generator::BoxTextGenerator;
pub use generator::TextGenerator;
