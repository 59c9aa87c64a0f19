//! # Message Bus Abstraction
//!
//! Shared messaging layer for the PayeTonKawa services.
//!
//! ## Why This Lives in a Platform Crate
//!
//! All three services publish through the same topic exchange and the orders
//! service consumes from queues bound to it. Keeping the envelope, the
//! topology and the transport behind one crate allows:
//! - Services to share one wire contract without depending on each other
//! - Config-driven swap between NATS JetStream (production) and InMemory
//!   (dev/test)
//!
//! ## Implementations
//!
//! - **JetStreamBus**: Production implementation over NATS JetStream; the
//!   `payetonkawa` exchange maps to a durable stream, queues map to durable
//!   pull consumers with explicit acks and one delivery in flight.
//! - **InMemoryBus**: Test/dev implementation with the same queue semantics
//!   (FIFO buffers, redelivery on nack) and no external process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{topology, InMemoryBus, JetStreamBus, MessageBus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Production: NATS JetStream
//! let bus: Arc<dyn MessageBus> = Arc::new(JetStreamBus::connect("nats://localhost:4222").await?);
//!
//! // Dev/Test: In-Memory
//! let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new());
//!
//! // Declare the exchange (and, for consumers, queues and bindings)
//! bus.ensure_topology(&topology::COMMANDES_QUEUES).await?;
//!
//! // Publish an event
//! bus.publish("client.deleted", br#"{"event":"client_deleted","client_id":42}"#.to_vec())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod envelope;
mod inmemory_bus;
mod jetstream_bus;
pub mod topology;

pub use envelope::{ClientData, CommandeData, Envelope, EventBody, ProduitData, SEUIL_STOCK_BAS};
pub use inmemory_bus::InMemoryBus;
pub use jetstream_bus::JetStreamBus;
pub use topology::QueueBinding;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// A message delivered to a queue consumer
#[derive(Debug, Clone)]
pub struct Delivery {
    /// The routing key the message was published with
    pub routing_key: String,
    /// The message payload (raw bytes, JSON on the wire)
    pub payload: Vec<u8>,
    /// Whether this delivery is a redelivery after a nack
    pub redelivered: bool,
}

/// What a consumer decided to do with a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Processing succeeded; remove the message from the queue
    Ack,
    /// Processing failed; `requeue` puts the message back for redelivery,
    /// otherwise it is discarded
    Nack { requeue: bool },
}

/// Per-queue message handler
///
/// The bus drives the receive loop; the handler only decides the outcome of
/// one delivery. Handlers must be cheap to share across deliveries.
#[async_trait]
pub trait QueueHandler: Send + Sync {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome;
}

/// Errors that can occur when using the message bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("topology declaration failed: {0}")]
    Topology(String),

    #[error("failed to publish message: {0}")]
    Publish(String),

    #[error("consumer error on queue {queue}: {reason}")]
    Consume { queue: String, reason: String },
}

/// Result type for message bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Topic-exchange messaging abstraction
///
/// One durable exchange, routing-key based bindings, durable queues with
/// explicit acknowledgement. Implementations must deliver at-least-once and
/// must not drop an unacknowledged message.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Declare the exchange and the given queues with their bindings.
    ///
    /// Idempotent: every service calls this at startup, publishers with an
    /// empty queue list, consumers with the queues they own. Redeclaring an
    /// existing queue never discards buffered messages.
    async fn ensure_topology(&self, queues: &[QueueBinding]) -> BusResult<()>;

    /// Publish one persistent message to the exchange.
    ///
    /// The message is routed to every queue whose binding matches
    /// `routing_key`; with no matching binding it is dropped. No internal
    /// retry and no buffering: the caller sees exactly one transport
    /// attempt.
    async fn publish(&self, routing_key: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Run the receive loop for one queue until `shutdown` flips to true.
    ///
    /// Deliveries are handed to `handler` one at a time (prefetch 1); the
    /// loop acks or nacks according to the returned outcome before taking
    /// the next message. The shutdown signal is only observed between
    /// messages, so an in-flight delivery is always settled.
    async fn run_consumer(
        &self,
        queue: &str,
        handler: Arc<dyn QueueHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> BusResult<()>;
}

impl fmt::Debug for dyn MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageBus")
    }
}
