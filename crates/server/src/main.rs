//! Orderview server binary.
//!
//! Startup order matters: the cache is hydrated from the store before
//! the ingestion consumer starts and before the HTTP listener binds,
//! so no lookup or save ever observes a cold cache for previously
//! persisted orders.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orderview_server::cache::Cache;
use orderview_server::config::ServerConfig;
use orderview_server::db::{self, PgOrderStore};
use orderview_server::ingest::Consumer;
use orderview_server::routes;
use orderview_server::services::OrderService;
use orderview_server::state::AppState;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orderview_server=info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("database pool created");

    let store = Arc::new(PgOrderStore::new(pool.clone()));
    let orders = Arc::new(OrderService::new(store, Cache::new()));

    // One-time hydration: mirror the whole store into the cache before
    // taking any traffic.
    let hydrated = orders.hydrate().await.expect("Cache hydration failed");
    tracing::info!(records = hydrated, "cache hydrated from store");

    let (ingest_tx, ingest_rx) = mpsc::channel(config.ingest_buffer);
    tokio::spawn(Consumer::new(Arc::clone(&orders)).run(ingest_rx));

    let addr = config.socket_addr();
    let state = AppState::new(config, pool, orders, ingest_tx);
    let app = routes::router(state);

    tracing::info!("orderview listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
