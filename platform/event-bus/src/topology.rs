//! Exchange and queue topology shared by all services.
//!
//! One durable topic exchange carries every domain event; routing keys are
//! `<entity>.<action>`. The orders service owns the only queues: one for
//! customer deletions, one for product deletions.

/// Name of the durable topic exchange (JetStream stream in production).
pub const EXCHANGE: &str = "payetonkawa";

/// Subject space captured by the exchange.
pub const EXCHANGE_SUBJECTS: [&str; 3] = ["client.>", "commande.>", "produit.>"];

/// A durable queue and the routing key it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueBinding {
    pub queue: &'static str,
    pub routing_key: &'static str,
}

/// Queue the orders service drains to reconcile customer deletions.
pub const COMMANDES_CLIENT_EVENTS: QueueBinding = QueueBinding {
    queue: "commandes_client_events",
    routing_key: "client.deleted",
};

/// Queue the orders service drains for product deletions (log only).
pub const COMMANDES_PRODUIT_EVENTS: QueueBinding = QueueBinding {
    queue: "commandes_produit_events",
    routing_key: "produit.deleted",
};

/// All queues declared by the orders service at startup.
pub const COMMANDES_QUEUES: [QueueBinding; 2] =
    [COMMANDES_CLIENT_EVENTS, COMMANDES_PRODUIT_EVENTS];
