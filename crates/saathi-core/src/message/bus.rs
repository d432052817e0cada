//! In-process A2A message bus.
//!
//! The `MessageBus` delivers envelopes straight to the target agent's
//! handler and returns a `DeliveryResult` for every send. Every envelope is
//! recorded before delivery is attempted, both in the history of its
//! (unordered) sender/recipient pair and in a global send log.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::join_all;
use saathi_types::message::{A2aMessage, DeliveryResult, MessageKind, Payload, QueueReason};
use tracing::{debug, error, info, warn};

use super::handler;
use crate::agent::AgentRegistry;
use crate::parallel::panic_message;

/// Unordered agent pair; `(a, b)` and `(b, a)` map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConversationKey(String, String);

impl ConversationKey {
    fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// Routes envelopes to registered agents and keeps the message history.
pub struct MessageBus {
    registry: Arc<AgentRegistry>,
    conversations: DashMap<ConversationKey, Vec<A2aMessage>>,
    send_log: Mutex<Vec<A2aMessage>>,
}

impl MessageBus {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            conversations: DashMap::new(),
            send_log: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Record `msg` and deliver it to its target's handler.
    ///
    /// Never fails: an unregistered target yields `Queued`, and a handler
    /// error or panic yields `DeliveryFailed`.
    pub async fn send(&self, msg: A2aMessage) -> DeliveryResult {
        self.record(&msg);
        let message_id = msg.id().to_string();

        let Some(agent) = self.registry.lookup(msg.to()) else {
            warn!(
                message_id = %message_id,
                from = msg.from(),
                to = msg.to(),
                "target agent not registered, message queued"
            );
            return DeliveryResult::Queued {
                message_id,
                reason: QueueReason::AgentNotRegistered,
            };
        };

        match AssertUnwindSafe(handler::dispatch(&agent, &msg))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => {
                info!(
                    message_id = %message_id,
                    from = msg.from(),
                    to = msg.to(),
                    kind = %msg.kind(),
                    outcome = outcome.status(),
                    "message delivered"
                );
                DeliveryResult::Delivered {
                    message_id,
                    outcome,
                }
            }
            Ok(Err(e)) => {
                error!(message_id = %message_id, to = msg.to(), error = %e, "handler failed");
                DeliveryResult::DeliveryFailed {
                    message_id,
                    error: e.to_string(),
                }
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(message_id = %message_id, to = msg.to(), %reason, "handler panicked");
                DeliveryResult::DeliveryFailed {
                    message_id,
                    error: format!("handler panicked: {reason}"),
                }
            }
        }
    }

    /// Send one envelope per registered agent other than `from`.
    ///
    /// Deliveries run concurrently; results are keyed by recipient name.
    pub async fn broadcast(
        &self,
        from: &str,
        kind: MessageKind,
        payload: Payload,
    ) -> BTreeMap<String, DeliveryResult> {
        let recipients: Vec<String> = self
            .registry
            .names()
            .into_iter()
            .filter(|name| name != from)
            .collect();
        debug!(from, %kind, recipients = recipients.len(), "broadcasting");

        let sends = recipients.iter().map(|to| {
            let msg = A2aMessage::new(kind, from, to.as_str(), payload.clone());
            self.send(msg)
        });
        let results = join_all(sends).await;

        recipients.into_iter().zip(results).collect()
    }

    /// Messages exchanged between `a` and `b`, in either direction, oldest
    /// first.
    pub fn history(&self, a: &str, b: &str) -> Vec<A2aMessage> {
        let mut messages = self
            .conversations
            .get(&ConversationKey::new(a, b))
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        messages.sort_by_key(|m| m.created_at());
        messages
    }

    /// Every envelope sent through this bus, in send order.
    pub fn sent(&self) -> Vec<A2aMessage> {
        self.send_log.lock().expect("send log lock poisoned").clone()
    }

    pub fn sent_count(&self) -> usize {
        self.send_log.lock().expect("send log lock poisoned").len()
    }

    fn record(&self, msg: &A2aMessage) {
        self.conversations
            .entry(ConversationKey::new(msg.from(), msg.to()))
            .or_default()
            .push(msg.clone());
        self.send_log
            .lock()
            .expect("send log lock poisoned")
            .push(msg.clone());
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("agents", &self.registry.len())
            .field("sent", &self.sent_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
