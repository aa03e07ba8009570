use rapidblood::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{InMemoryRepository, RepositoryState},
    slot::{FileSlot, SlotState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, catalog, session store, HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rapidblood=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Catalog
    let repo = match config.catalog_seed {
        Some(seed) => InMemoryRepository::with_seed(seed),
        None => InMemoryRepository::new(),
    };
    let repo = Arc::new(repo) as RepositoryState;

    // 4. Durable slot; the session store restores from it inside AppState::new.
    let slot = FileSlot::new(config.slot_dir.clone());
    tracing::info!(dir = %slot.dir().display(), key = %config.session_key, "session slot ready");
    let slot = Arc::new(slot) as SlotState;

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config, repo, slot);

    // 5. Router and server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: could not bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
