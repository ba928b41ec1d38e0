//! Edgeboard - signal API for the sports betting dashboard

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edgeboard_backend::{
    api::{create_router, AppState},
    config::{load_env, Config, KvBackend},
    middleware::RateLimitLayer,
    refresher,
    store::{BlobStore, KvStore, MemoryKv, SignalRepository, SqliteKv},
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 Edgeboard signal API starting");

    let kv: Arc<dyn KvStore> = match config.kv_backend {
        KvBackend::Memory => {
            warn!("Using in-memory store, the board is lost on restart");
            Arc::new(MemoryKv::new())
        }
        KvBackend::Sqlite => {
            let path = config.resolved_db_path();
            info!("📊 Blob store at: {}", path);
            Arc::new(SqliteKv::new(&path)?)
        }
    };

    let repo = Arc::new(SignalRepository::new(
        BlobStore::new(kv),
        config.rng_seed,
        config.signal_threshold,
    ));

    if config.seed_markets > 0 && repo.markets()?.is_empty() {
        let summary = repo
            .init(config.seed_markets, None, None)
            .context("Failed to seed initial board")?;
        info!(
            "🎲 Seeded board: {} markets, {} signals",
            summary.markets, summary.signals
        );
    } else {
        info!("💾 Existing signals in store: {}", repo.signals()?.len());
    }

    let limiter = RateLimitLayer::new(config.rate_limit());
    limiter.spawn_cleanup(limiter.window());

    if let Some(period) = config.refresh_interval() {
        refresher::spawn(repo.clone(), period);
    } else {
        info!("Board refresher disabled");
    }

    let app = create_router(AppState::new(repo), Some(limiter));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Edgeboard stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edgeboard_backend=debug,edgeboard=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
