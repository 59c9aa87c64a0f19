//! Publishes order lifecycle events after the database write has committed.
//!
//! Publishing is best effort: a failed publish is logged and the HTTP
//! response proceeds unchanged, so the API never fails because the broker
//! is down.

use std::sync::Arc;

use event_bus::{CommandeData, Envelope, EventBody, MessageBus};

use crate::models::Commande;

#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn MessageBus>,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    pub async fn commande_created(&self, commande: &Commande) {
        self.send(EventBody::CommandeCreated {
            commande_id: commande.id,
            data: CommandeData {
                client_id: commande.client_id,
                total: commande.total,
                statut: commande.statut.clone(),
            },
        })
        .await;
    }

    pub async fn commande_updated(&self, commande: &Commande) {
        self.send(EventBody::CommandeUpdated {
            commande_id: commande.id,
            statut: commande.statut.clone(),
        })
        .await;
    }

    pub async fn commande_deleted(&self, commande_id: i32) {
        self.send(EventBody::CommandeDeleted { commande_id }).await;
    }

    async fn send(&self, body: EventBody) {
        let envelope = Envelope::new(body);
        let routing_key = envelope.routing_key();

        let payload = match envelope.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to serialize event {}: {}", routing_key, e);
                return;
            }
        };

        match self.bus.publish(routing_key, payload).await {
            Ok(_) => {
                tracing::debug!("Published event {}", routing_key);
            }
            Err(e) => {
                tracing::error!("Failed to publish event {}: {}", routing_key, e);
            }
        }
    }
}
