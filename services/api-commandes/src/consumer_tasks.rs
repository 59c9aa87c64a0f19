use std::sync::Arc;

use event_bus::topology::{COMMANDES_CLIENT_EVENTS, COMMANDES_PRODUIT_EVENTS};
use event_bus::MessageBus;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::consumer::{ClientEventsHandler, ProduitEventsHandler};
use crate::store::CommandeStore;

/// Start the consumer task for the `client.deleted` queue.
pub fn start_client_events_consumer(
    bus: Arc<dyn MessageBus>,
    store: Arc<dyn CommandeStore>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Starting client events consumer");

        let handler = Arc::new(ClientEventsHandler::new(store));
        if let Err(e) = bus
            .run_consumer(COMMANDES_CLIENT_EVENTS.queue, handler, shutdown)
            .await
        {
            tracing::error!("Client events consumer failed: {}", e);
        }

        tracing::warn!("Client events consumer stopped");
    })
}

/// Start the consumer task for the `produit.deleted` queue.
pub fn start_produit_events_consumer(
    bus: Arc<dyn MessageBus>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Starting product events consumer");

        let handler = Arc::new(ProduitEventsHandler);
        if let Err(e) = bus
            .run_consumer(COMMANDES_PRODUIT_EVENTS.queue, handler, shutdown)
            .await
        {
            tracing::error!("Product events consumer failed: {}", e);
        }

        tracing::warn!("Product events consumer stopped");
    })
}
