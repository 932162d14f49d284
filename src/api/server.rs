use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::Result;
use crate::error::Error;

use super::auth::require_basic_auth;
use super::handlers::{AppState, create_alert, delete_alert, health_check, query_alerts};

const API_PREFIX: &str = "/api/v1";

/// Build the application router.
///
/// Alert routes sit behind basic auth; the health check does not.
pub fn build_router(state: Arc<AppState>) -> Router {
    let alerts = Router::new()
        .route("/alert/create", post(create_alert))
        // kept for clients of the previous deployment
        .route("/alert/creat", post(create_alert))
        .route("/alert/query", get(query_alerts))
        .route("/alert/get", get(query_alerts))
        .route("/alert/delete", delete(delete_alert).post(delete_alert))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_basic_auth,
        ));

    let api = alerts.route("/monitor/health_check", get(health_check));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until Ctrl-C.
///
/// # Errors
///
/// Returns [`Error::Server`] if the accept loop fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    match listener.local_addr() {
        Ok(addr) => info!(%addr, "listening"),
        Err(err) => warn!(error = %err, "listening on unknown address"),
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| Error::Server { source })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
