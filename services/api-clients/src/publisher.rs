//! Publishes customer lifecycle events after the database write has
//! committed. Best effort, as everywhere: a failed publish is logged and
//! never surfaces to the HTTP caller.

use std::sync::Arc;

use event_bus::{ClientData, Envelope, EventBody, MessageBus};

use crate::models::Client;

#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn MessageBus>,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    pub async fn client_created(&self, client: &Client) {
        self.send(EventBody::ClientCreated {
            client_id: client.id,
            data: client_data(client),
        })
        .await;
    }

    pub async fn client_updated(&self, client: &Client) {
        self.send(EventBody::ClientUpdated {
            client_id: client.id,
            data: client_data(client),
        })
        .await;
    }

    pub async fn client_deleted(&self, client_id: i32) {
        self.send(EventBody::ClientDeleted { client_id }).await;
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

/// Denormalized customer fields carried in created/updated events, so
/// consumers never have to call back into this service.
fn client_data(client: &Client) -> ClientData {
    ClientData {
        nom: client.nom.clone(),
        prenom: client.prenom.clone(),
        email: client.email.clone(),
        telephone: client.telephone.clone(),
        adresse: client.adresse.clone(),
    }
}
