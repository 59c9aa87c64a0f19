//! Publishes product lifecycle events after the database write has
//! committed, plus the low-stock alert. Best effort: a failed publish is
//! logged and never surfaces to the HTTP caller.

use std::sync::Arc;

use event_bus::{Envelope, EventBody, MessageBus, ProduitData, SEUIL_STOCK_BAS};

use crate::models::Produit;

#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn MessageBus>,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    pub async fn produit_created(&self, produit: &Produit) {
        self.send(EventBody::ProduitCreated {
            produit_id: produit.id,
            data: produit_data(produit),
        })
        .await;
    }

    pub async fn produit_updated(&self, produit: &Produit) {
        self.send(EventBody::ProduitUpdated {
            produit_id: produit.id,
            data: produit_data(produit),
        })
        .await;
    }

    pub async fn produit_deleted(&self, produit_id: i32) {
        self.send(EventBody::ProduitDeleted { produit_id }).await;
    }

    /// Alert for a product whose stock just landed under the threshold.
    pub async fn produit_stock_low(&self, produit: &Produit) {
        self.send(EventBody::ProduitStockLow {
            produit_id: produit.id,
            produit_nom: produit.nom.clone(),
            stock_actuel: produit.stock,
            seuil_alerte: SEUIL_STOCK_BAS,
        })
        .await;
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

fn produit_data(produit: &Produit) -> ProduitData {
    ProduitData {
        nom: produit.nom.clone(),
        prix: produit.prix,
        stock: produit.stock,
    }
}
