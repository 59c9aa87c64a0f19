use std::sync::Arc;

use event_bus::{topology, InMemoryBus, JetStreamBus, MessageBus};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use api_commandes::{
    config::Config,
    publisher::EventPublisher,
    routes::{self, AppState},
    start_client_events_consumer, start_produit_events_consumer,
    store::{CommandeStore, PgCommandeStore},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting api-commandes service...");

    // Load configuration from environment
    let config = Config::from_env()
        .expect("Failed to load configuration from environment");

    tracing::info!(
        "Configuration loaded: host={}, port={}, bus_type={}",
        config.host,
        config.port,
        config.bus_type
    );

    // Database connection
    tracing::info!("Connecting to database...");
    let pool = api_commandes::db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Create message bus
    let bus: Arc<dyn MessageBus> = match config.bus_type.to_lowercase().as_str() {
        "inmemory" => {
            tracing::info!("Using InMemory message bus");
            Arc::new(InMemoryBus::new())
        }
        "nats" => {
            tracing::info!("Connecting to NATS at {}", config.nats_url);
            let bus = JetStreamBus::connect(&config.nats_url)
                .await
                .expect("Failed to connect to NATS");
            Arc::new(bus)
        }
        _ => panic!("Invalid BUS_TYPE: {}. Must be 'inmemory' or 'nats'", config.bus_type),
    };

    // Declare the exchange and this service's queues
    bus.ensure_topology(&topology::COMMANDES_QUEUES)
        .await
        .expect("Failed to declare message topology");

    let store: Arc<dyn CommandeStore> = Arc::new(PgCommandeStore::new(pool.clone()));

    // Start consumers with a shared shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let client_consumer =
        start_client_events_consumer(bus.clone(), store.clone(), shutdown_rx.clone());
    let produit_consumer = start_produit_events_consumer(bus.clone(), shutdown_rx);

    // Build the application router
    let state = Arc::new(AppState {
        store,
        publisher: EventPublisher::new(bus.clone()),
        api_key: config.api_key.clone(),
    });

    let app = routes::app(state).layer(
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    );

    // Bind to the configured address
    let addr = config.bind_addr();
    tracing::info!("api-commandes listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    // Serve until interrupted, then stop the consumers between messages
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");

    tracing::info!("Stopping consumers...");
    let _ = shutdown_tx.send(true);
    let _ = client_consumer.await;
    let _ = produit_consumer.await;

    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
