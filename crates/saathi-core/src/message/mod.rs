//! Agent-to-agent (A2A) messaging.
//!
//! - `bus` -- `MessageBus` with direct delivery, pairwise history, and broadcast
//! - `envelope` -- helper constructors for `A2aMessage`
//! - `handler` -- per-kind dispatch to a registered agent

pub mod bus;
pub mod envelope;
pub mod handler;

pub use bus::MessageBus;
