use clientstore::{web, ClientStore, Config, Database};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clientstore=debug,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("clientstore failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("clientstore starting...");

    let config = Config::load()?;
    info!(
        "Listening address {}, AOF {} at {} ({:?})",
        config.server.addr,
        if config.storage.enabled { "enabled" } else { "disabled" },
        config.storage.path.display(),
        config.storage.sync_policy
    );

    let db = Arc::new(Database::open(&config.storage)?);
    let stats = db.stats().await?;
    info!("Storage ready: {} records, next id {}", stats.rows, stats.next_id);

    let state = web::AppState {
        store: ClientStore::new(db.clone()),
        request_timeout: config.server.request_timeout(),
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
    });

    let served = web::run_web_server(&config.server.addr, state, shutdown).await;

    db.shutdown().await;
    info!("clientstore stopped");
    served
}
