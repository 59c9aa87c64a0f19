//! Reacts to deletions announced by the other services.
//!
//! A deleted customer cannot be expressed as a foreign key because customers
//! live in another service's database, so the consumer repairs the link after
//! the fact: every order of the deleted customer is moved to
//! `customer_deleted`. The assignment is absolute, which makes redelivery of
//! the same event harmless.

use std::sync::Arc;

use async_trait::async_trait;
use event_bus::{Delivery, Envelope, EventBody, HandlerOutcome, QueueHandler};

use crate::models::statut;
use crate::store::{CommandeStore, StoreError};

/// Sets every order of the customer to `customer_deleted` and returns how
/// many orders were touched. Zero orders is a valid outcome, not an error.
pub async fn mark_orders_customer_deleted(
    store: &dyn CommandeStore,
    client_id: i32,
) -> Result<usize, StoreError> {
    let commandes = store.find_by_client(client_id).await?;

    let mut updated = 0;
    for commande in &commandes {
        // An order deleted between the lookup and the update just drops out
        // of the count.
        if store
            .update_statut(commande.id, statut::CUSTOMER_DELETED)
            .await?
            .is_some()
        {
            updated += 1;
        }
    }

    Ok(updated)
}

/// Handler bound to `commandes_client_events` (routing key `client.deleted`).
pub struct ClientEventsHandler {
    store: Arc<dyn CommandeStore>,
}

impl ClientEventsHandler {
    pub fn new(store: Arc<dyn CommandeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueueHandler for ClientEventsHandler {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome {
        let client_id = match Envelope::from_bytes(&delivery.payload) {
            Ok(Envelope {
                body: EventBody::ClientDeleted { client_id },
                ..
            }) => client_id,
            Ok(envelope) => {
                tracing::error!(
                    routing_key = %delivery.routing_key,
                    event = envelope.routing_key(),
                    "Unexpected event on client events queue, requeueing"
                );
                return HandlerOutcome::Nack { requeue: true };
            }
            Err(e) => {
                tracing::error!(
                    routing_key = %delivery.routing_key,
                    error = %e,
                    "Unparseable client event, requeueing"
                );
                return HandlerOutcome::Nack { requeue: true };
            }
        };

        tracing::info!("Customer {} deleted, reconciling their orders", client_id);

        match mark_orders_customer_deleted(self.store.as_ref(), client_id).await {
            Ok(count) => {
                tracing::info!("{} orders marked as customer_deleted", count);
                HandlerOutcome::Ack
            }
            Err(e) => {
                tracing::error!(
                    "Failed to reconcile orders of customer {}: {}",
                    client_id,
                    e
                );
                HandlerOutcome::Nack { requeue: true }
            }
        }
    }
}

/// Handler bound to `commandes_produit_events` (routing key
/// `produit.deleted`). Observational only, orders keep their product ids.
pub struct ProduitEventsHandler;

#[async_trait]
impl QueueHandler for ProduitEventsHandler {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome {
        match Envelope::from_bytes(&delivery.payload) {
            Ok(Envelope {
                body: EventBody::ProduitDeleted { produit_id },
                ..
            }) => {
                tracing::info!("Product {} deleted, no order changes required", produit_id);
                HandlerOutcome::Ack
            }
            Ok(envelope) => {
                tracing::error!(
                    routing_key = %delivery.routing_key,
                    event = envelope.routing_key(),
                    "Unexpected event on product events queue, requeueing"
                );
                HandlerOutcome::Nack { requeue: true }
            }
            Err(e) => {
                tracing::error!(
                    routing_key = %delivery.routing_key,
                    error = %e,
                    "Unparseable product event, requeueing"
                );
                HandlerOutcome::Nack { requeue: true }
            }
        }
    }
}
