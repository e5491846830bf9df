//! HTTP server implementation

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{create_client, get_clients, AppState};

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/clients", get(get_clients).post(create_client))
        .route("/clients/", get(get_clients).post(create_client))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the web server until `shutdown` is cancelled
pub async fn run_web_server(
    addr: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Clients API available at http://{}/clients/", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Web server stopped");
    Ok(())
}
