//! In-memory implementation of the MessageBus trait for testing and development

use crate::topology::QueueBinding;
use crate::{BusError, BusResult, Delivery, HandlerOutcome, MessageBus, QueueHandler};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};

/// MessageBus implementation backed by in-process queues
///
/// This implementation is suitable for:
/// - Unit and scenario tests (no external dependencies)
/// - Local development without Docker (`BUS_TYPE=inmemory`)
///
/// It reproduces the broker semantics the consumers rely on: routing-key
/// bindings with wildcards, FIFO queues, one delivery in flight per queue,
/// redelivery at the front of the queue on nack(requeue), and drop on
/// nack(discard). Messages published with no matching binding are dropped,
/// as a topic exchange would.
///
/// # Example
/// ```rust
/// use event_bus::{InMemoryBus, MessageBus, QueueBinding};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = InMemoryBus::new();
/// bus.ensure_topology(&[QueueBinding {
///     queue: "commandes_client_events",
///     routing_key: "client.deleted",
/// }])
/// .await?;
///
/// bus.publish("client.deleted", b"{}".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBus {
    state: Arc<Mutex<ExchangeState>>,
}

#[derive(Default)]
struct ExchangeState {
    bindings: Vec<Binding>,
    queues: HashMap<String, Queue>,
}

struct Binding {
    pattern: String,
    queue: String,
}

#[derive(Default)]
struct Queue {
    messages: VecDeque<QueuedMessage>,
    notify: Arc<Notify>,
}

struct QueuedMessage {
    routing_key: String,
    payload: Vec<u8>,
    redelivered: bool,
}

impl InMemoryBus {
    /// Create a new in-memory bus with no exchange topology.
    ///
    /// Callers declare queues and bindings through
    /// [`MessageBus::ensure_topology`] exactly as they would against the
    /// real broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a routing key matches a binding pattern
    ///
    /// Supports the broker's wildcards:
    /// - `*` matches exactly one token
    /// - `>` matches one or more trailing tokens
    ///
    /// # Examples
    /// - `client.>` matches `client.deleted`
    /// - `*.deleted` matches `produit.deleted`
    /// - `client.*` does NOT match `client.address.changed` (too many tokens)
    fn matches_pattern(routing_key: &str, pattern: &str) -> bool {
        let key_tokens: Vec<&str> = routing_key.split('.').collect();
        let pattern_tokens: Vec<&str> = pattern.split('.').collect();

        let mut k_idx = 0;
        let mut p_idx = 0;

        while k_idx < key_tokens.len() && p_idx < pattern_tokens.len() {
            let pattern_token = pattern_tokens[p_idx];

            if pattern_token == ">" {
                // `>` matches all remaining tokens
                return true;
            } else if pattern_token == "*" || key_tokens[k_idx] == pattern_token {
                k_idx += 1;
                p_idx += 1;
            } else {
                return false;
            }
        }

        // Both must be exhausted for a full match (unless pattern ended with `>`)
        k_idx == key_tokens.len() && p_idx == pattern_tokens.len()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn ensure_topology(&self, queues: &[QueueBinding]) -> BusResult<()> {
        let mut state = self.state.lock().await;
        for binding in queues {
            state.queues.entry(binding.queue.to_string()).or_default();
            let already_bound = state
                .bindings
                .iter()
                .any(|b| b.pattern == binding.routing_key && b.queue == binding.queue);
            if !already_bound {
                state.bindings.push(Binding {
                    pattern: binding.routing_key.to_string(),
                    queue: binding.queue.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn publish(&self, routing_key: &str, payload: Vec<u8>) -> BusResult<()> {
        let mut state = self.state.lock().await;
        let targets: Vec<String> = state
            .bindings
            .iter()
            .filter(|b| Self::matches_pattern(routing_key, &b.pattern))
            .map(|b| b.queue.clone())
            .collect();

        // No matching binding: the exchange drops the message
        for queue_name in targets {
            if let Some(queue) = state.queues.get_mut(&queue_name) {
                queue.messages.push_back(QueuedMessage {
                    routing_key: routing_key.to_string(),
                    payload: payload.clone(),
                    redelivered: false,
                });
                queue.notify.notify_one();
            }
        }
        Ok(())
    }

    async fn run_consumer(
        &self,
        queue: &str,
        handler: Arc<dyn QueueHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> BusResult<()> {
        let notify = {
            let state = self.state.lock().await;
            let declared = state.queues.get(queue).ok_or_else(|| BusError::Consume {
                queue: queue.to_string(),
                reason: "queue not declared".to_string(),
            })?;
            declared.notify.clone()
        };

        tracing::info!(queue, "consumer started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let next = {
                let mut state = self.state.lock().await;
                state
                    .queues
                    .get_mut(queue)
                    .and_then(|q| q.messages.pop_front())
            };

            let Some(message) = next else {
                tokio::select! {
                    _ = notify.notified() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            // Sender dropped: treat as shutdown
                            break;
                        }
                    }
                }
                continue;
            };

            let delivery = Delivery {
                routing_key: message.routing_key.clone(),
                payload: message.payload.clone(),
                redelivered: message.redelivered,
            };

            match handler.handle(&delivery).await {
                HandlerOutcome::Ack => {}
                HandlerOutcome::Nack { requeue: true } => {
                    let mut state = self.state.lock().await;
                    if let Some(q) = state.queues.get_mut(queue) {
                        q.messages.push_front(QueuedMessage {
                            redelivered: true,
                            ..message
                        });
                        q.notify.notify_one();
                    }
                }
                HandlerOutcome::Nack { requeue: false } => {}
            }
        }
        tracing::info!(queue, "consumer stopped");
        Ok(())
    }
}
