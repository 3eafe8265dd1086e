//! HTTP transport: `POST /rpc` for JSON-RPC, `GET /health` for liveness.
//!
//! Structurally invalid bodies are answered with HTTP 400 and a `-32600`
//! error; every other outcome, JSON-RPC errors included, is HTTP 200.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use jsonrpc_dispatch::{parse_request_slice, Dispatcher};

use crate::error::{ServerError, ServerResult};

/// Shared state passed to all handlers via axum State.
pub struct ServerState {
    pub dispatcher: Dispatcher,
}

/// Build the axum router around a dispatcher.
pub fn build_router(dispatcher: Dispatcher) -> Router {
    let state = Arc::new(ServerState { dispatcher });

    Router::new()
        .route("/rpc", post(handle_rpc))
        .route("/health", get(handle_health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// HTTP server for JSON-RPC clients.
pub struct HttpTransport {
    dispatcher: Dispatcher,
}

impl HttpTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serve on `addr` until Ctrl+C.
    pub async fn run(&self, addr: &str) -> ServerResult<()> {
        let app = build_router(self.dispatcher.clone());

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;

        tracing::info!("HTTP transport listening on http://{local}/rpc");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        tracing::info!("HTTP transport stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn handle_rpc(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let request = match parse_request_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected malformed request: {e}");
            return (StatusCode::BAD_REQUEST, Json(e.to_response())).into_response();
        }
    };

    let response = state.dispatcher.handle(request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "methods": state.dispatcher.registry().method_names(),
    }))
}
