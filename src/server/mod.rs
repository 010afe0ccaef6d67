//! HTTP control surface: the chat webhook plus health, monitor listing and
//! metrics, all on one listener.

pub mod commands;
pub mod types;

pub use commands::{Command, CommandRouter, Handled};
pub use types::{Chat, IncomingMessage, Update};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::core::metrics::RelayMetrics;
use crate::monitor::MonitorRegistry;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,
    pub registry: Arc<MonitorRegistry>,
    pub metrics: Arc<RelayMetrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(webhook))
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .route("/monitors", get(monitors))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// Always 200: the sender must not redeliver an update the relay chose to drop.
async fn webhook(State(state): State<AppState>, body: Bytes) -> StatusCode {
    state.router.handle_update(&body).await;
    StatusCode::OK
}

async fn health() -> &'static str {
    "OK"
}

async fn monitors(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry.list().await)
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!("Failed to render metrics: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
