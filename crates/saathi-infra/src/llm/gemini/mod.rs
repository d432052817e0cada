//! Google Gemini text generator.
//!
//! [`GeminiGenerator`] implements
//! [`TextGenerator`](saathi_core::llm::TextGenerator) over the
//! `generateContent` endpoint of the Generative Language API.

pub mod client;
pub mod types;

pub use client::GeminiGenerator;
