use std::sync::Arc;

use event_bus::{InMemoryBus, JetStreamBus, MessageBus};
use tracing_subscriber::EnvFilter;

use api_clients::{
    config::Config,
    publisher::EventPublisher,
    routes::{self, AppState},
    store::{ClientStore, PgClientStore},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting api-clients service...");

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
    let pool = api_clients::db::init_pool(&config.database_url)
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

    // Publisher only: declare the exchange, no queues
    bus.ensure_topology(&[])
        .await
        .expect("Failed to declare message topology");

    let store: Arc<dyn ClientStore> = Arc::new(PgClientStore::new(pool.clone()));

    // Build the application router
    let state = Arc::new(AppState {
        store,
        publisher: EventPublisher::new(bus),
    });
    let app = routes::app(state);

    // Bind to the configured address
    let addr = config.bind_addr();
    tracing::info!("api-clients listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    // Start the server
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
