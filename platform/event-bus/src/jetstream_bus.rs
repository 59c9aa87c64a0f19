//! NATS JetStream implementation of the MessageBus trait

use crate::topology::{EXCHANGE, EXCHANGE_SUBJECTS, QueueBinding};
use crate::{BusError, BusResult, Delivery, HandlerOutcome, MessageBus, QueueHandler};
use async_nats::jetstream::consumer::{pull, AckPolicy, PullConsumer};
use async_nats::jetstream::{self, stream, AckKind, Context};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// MessageBus implementation over NATS JetStream
///
/// This is the production transport. The `payetonkawa` exchange is a durable
/// file-backed stream covering the whole routing-key space; each queue is a
/// durable pull consumer filtered to its binding, with explicit acks and at
/// most one unacknowledged delivery in flight (prefetch 1). Nack(requeue)
/// maps to NAK, nack(discard) to TERM.
///
/// # Example
/// ```rust,no_run
/// use event_bus::{JetStreamBus, MessageBus};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = JetStreamBus::connect("nats://localhost:4222").await?;
/// bus.ensure_topology(&[]).await?;
/// bus.publish("client.deleted", b"{}".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JetStreamBus {
    context: Context,
}

impl JetStreamBus {
    /// Connect to a NATS server and wrap its JetStream context.
    pub async fn connect(url: &str) -> BusResult<Self> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Create a bus from an already-connected NATS client.
    pub fn new(client: async_nats::Client) -> Self {
        Self {
            context: jetstream::new(client),
        }
    }
}

#[async_trait]
impl MessageBus for JetStreamBus {
    async fn ensure_topology(&self, queues: &[QueueBinding]) -> BusResult<()> {
        let stream_cfg = stream::Config {
            name: EXCHANGE.to_string(),
            subjects: EXCHANGE_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            storage: stream::StorageType::File,
            max_age: Duration::from_secs(60 * 60 * 24 * 14), // 14 days
            ..Default::default()
        };

        if self.context.get_stream(EXCHANGE).await.is_err() {
            self.context
                .create_stream(stream_cfg)
                .await
                .map_err(|e| BusError::Topology(e.to_string()))?;
        }

        let stream = self
            .context
            .get_stream(EXCHANGE)
            .await
            .map_err(|e| BusError::Topology(e.to_string()))?;

        for binding in queues {
            stream
                .get_or_create_consumer(
                    binding.queue,
                    pull::Config {
                        durable_name: Some(binding.queue.to_string()),
                        filter_subject: binding.routing_key.to_string(),
                        ack_policy: AckPolicy::Explicit,
                        // One unacknowledged delivery in flight at a time
                        max_ack_pending: 1,
                        ..Default::default()
                    },
                )
                .await
                .map_err(|e| BusError::Topology(e.to_string()))?;
        }

        Ok(())
    }

    async fn publish(&self, routing_key: &str, payload: Vec<u8>) -> BusResult<()> {
        let mut headers = async_nats::HeaderMap::new();
        headers.insert("Content-Type", "application/json");

        let ack = self
            .context
            .publish_with_headers(routing_key.to_string(), headers, payload.into())
            .await
            .map_err(|e| BusError::Publish(e.to_string()))?;

        // Wait for the broker to confirm the write; this is the single
        // transport attempt the caller observes
        ack.await.map_err(|e| BusError::Publish(e.to_string()))?;

        Ok(())
    }

    async fn run_consumer(
        &self,
        queue: &str,
        handler: Arc<dyn QueueHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> BusResult<()> {
        let stream = self
            .context
            .get_stream(EXCHANGE)
            .await
            .map_err(|e| BusError::Consume {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?;

        let consumer: PullConsumer = stream
            .get_consumer(queue)
            .await
            .map_err(|e| BusError::Consume {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?;

        let mut messages = consumer
            .messages()
            .await
            .map_err(|e| BusError::Consume {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?;

        info!(queue, "consumer started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let next = tokio::select! {
                next = messages.next() => next,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender dropped: treat as shutdown
                        break;
                    }
                    continue;
                }
            };

            let Some(result) = next else {
                warn!(queue, "message stream ended");
                break;
            };

            let message = match result {
                Ok(message) => message,
                Err(e) => {
                    error!(queue, error = %e, "failed to pull message");
                    continue;
                }
            };

            let redelivered = message.info().map(|i| i.delivered > 1).unwrap_or(false);
            let delivery = Delivery {
                routing_key: message.subject.to_string(),
                payload: message.payload.to_vec(),
                redelivered,
            };

            let settle = match handler.handle(&delivery).await {
                HandlerOutcome::Ack => message.ack().await,
                HandlerOutcome::Nack { requeue: true } => {
                    message.ack_with(AckKind::Nak(None)).await
                }
                HandlerOutcome::Nack { requeue: false } => message.ack_with(AckKind::Term).await,
            };
            if let Err(e) = settle {
                // The broker will redeliver an unsettled message
                error!(queue, error = %e, "failed to settle delivery");
            }
        }
        info!(queue, "consumer stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::{mpsc, Mutex};

    // Note: this test requires a running NATS server with JetStream enabled
    // For CI, use InMemoryBus tests instead
    // For manual testing: docker run -p 4222:4222 nats:2.10-alpine -js

    struct ScriptedHandler {
        outcomes: Mutex<VecDeque<HandlerOutcome>>,
        seen: mpsc::UnboundedSender<Delivery>,
    }

    #[async_trait]
    impl QueueHandler for ScriptedHandler {
        async fn handle(&self, delivery: &Delivery) -> HandlerOutcome {
            let outcome = self
                .outcomes
                .lock()
                .await
                .pop_front()
                .unwrap_or(HandlerOutcome::Ack);
            let _ = self.seen.send(delivery.clone());
            outcome
        }
    }

    #[tokio::test]
    #[ignore] // Requires NATS server with JetStream
    async fn test_jetstream_publish_consume_ack() {
        let bus = JetStreamBus::connect("nats://localhost:4222")
            .await
            .expect("NATS server must be running on localhost:4222");

        let binding = QueueBinding {
            queue: "commandes_client_events",
            routing_key: "client.deleted",
        };
        bus.ensure_topology(&[binding]).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handler = Arc::new(ScriptedHandler {
            outcomes: Mutex::new(VecDeque::new()),
            seen: tx,
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let consumer = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.run_consumer(binding.queue, handler, shutdown_rx).await })
        };

        let payload = br#"{"event":"client_deleted","client_id":42,"timestamp":"2024-01-01T00:00:00Z"}"#
            .to_vec();
        bus.publish("client.deleted", payload.clone()).await.unwrap();

        let delivery = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timeout waiting for delivery")
            .expect("consumer dropped");
        assert_eq!(delivery.routing_key, "client.deleted");
        assert_eq!(delivery.payload, payload);

        shutdown_tx.send(true).unwrap();
        consumer.await.unwrap().unwrap();
    }
}
