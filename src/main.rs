use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;
use std::time::Duration;

use campuspay::config::Config;
use campuspay::db::{create_pool, init_db, queries, AppState};
use campuspay::handlers;
use campuspay::models::CreateStore;
use campuspay::payments::PayOsClient;

#[derive(Parser, Debug)]
#[command(name = "campuspay")]
#[command(about = "Payment and entitlement service for the campus map")]
struct Cli {
    /// Seed the database with a demo store (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds the database with a demo store for local testing.
/// Only runs in dev mode and when the store does not already exist.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    match queries::get_store_by_id(&conn, "demo-store") {
        Ok(Some(_)) => {
            tracing::info!("Demo store already exists, skipping seed");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to check for demo store: {}", e);
            return;
        }
    }

    let input = CreateStore {
        id: Some("demo-store".to_string()),
        name: "Demo Store".to_string(),
    };
    match queries::create_store(&conn, &input) {
        Ok(store) => {
            tracing::info!("============================================");
            tracing::info!("DEMO STORE SEEDED: {} ({})", store.name, store.id);
            tracing::info!("============================================");
        }
        Err(e) => tracing::warn!("Failed to seed demo store: {}", e),
    }
}

/// Spawns a background task that periodically clears pending orders from
/// checkouts that never completed. Runs hourly.
fn spawn_cleanup_task(state: AppState) {
    const STALE_PENDING_RETENTION_DAYS: i64 = 7;

    tokio::spawn(async move {
        let interval = Duration::from_secs(60 * 60);

        loop {
            tokio::time::sleep(interval).await;

            match state.db.get() {
                Ok(conn) => {
                    match queries::purge_stale_pending_orders(&conn, STALE_PENDING_RETENTION_DAYS) {
                        Ok(count) if count > 0 => {
                            tracing::debug!("Cleared {} stale pending orders", count);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!("Failed to clear stale pending orders: {}", e);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to get db connection for cleanup: {}", e);
                }
            }
        }
    });

    tracing::info!("Background cleanup task started (runs hourly)");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campuspay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; missing gateway secrets are fatal before any
    // request is served.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    // Create database connection pool and initialize the schema
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        gateway: Arc::new(PayOsClient::new(&config.gateway)),
        checksum_key: config.gateway.checksum_key.clone(),
    };

    // Seed demo data if --seed flag is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set CAMPUSPAY_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    // Start background cleanup task for abandoned checkouts
    spawn_cleanup_task(state.clone());

    // Build the application router
    let app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Track if we should clean up on exit
    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("CampusPay server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // Cleanup on exit if ephemeral mode
    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        // Also remove WAL and SHM files if they exist
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
        tracing::info!("Ephemeral cleanup complete");
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
