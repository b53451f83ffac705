//! Service entry point
//!
//! Wires configuration, the connection pool, the cache client, the
//! repository and the HTTP API together, then serves until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cscache::api::{create_router, AppState};
use cscache::cache::{CscClient, PrefixCacheable};
use cscache::config::Config;
use cscache::pool::{ConnectTarget, ConnectionPool};
use cscache::repository::InMemoryPersonStore;
use cscache::service::PersonService;

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cacheability policy and connection pool
/// 4. Start the pool's idle sweep task
/// 5. Wire the cache client, repository and service into the router
/// 6. Serve HTTP with graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cscache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting person service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: redis={}:{}, cache_max_size={}, prefixes={:?}, port={}",
        config.redis_host,
        config.redis_port,
        config.cache_max_size,
        config.cacheable_prefixes,
        config.server_port
    );

    let policy = Arc::new(PrefixCacheable::new(config.cacheable_prefixes.clone()));

    let target = ConnectTarget {
        host: config.redis_host.clone(),
        port: config.redis_port,
        password: config.redis_password.clone(),
    };
    info!("Connecting to cache server at {}:{}", target.host, target.port);
    let pool = ConnectionPool::new(target, config.pool.clone());
    let sweep_handle = pool.spawn_eviction_task();

    let client = Arc::new(CscClient::new(pool, config.cache_max_size, policy));
    let repository = Arc::new(InMemoryPersonStore::new());
    let service = PersonService::new(repository, client);

    let state = AppState::new(service);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server port");
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .expect("Server error");

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the pool
/// sweep task.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Pool sweep task aborted");
}
