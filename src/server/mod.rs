//! dashquery HTTP server
//!
//! This module provides the HTTP surface over the query dispatcher:
//! - Component chart and history data at /api/v1/components/:id/{chart,history}
//! - Ad-hoc chart queries at /api/v1/components/query
//! - Dashboard table listing at /api/v1/components/tables

use crate::config::ServerConfig;
use crate::error::Error;
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

pub mod middleware;
pub mod routes;
pub mod state;

use state::ServerState;

/// Create the main application router
pub fn create_app(state: ServerState, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/v1/components", routes::components::create_router())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)))
        .with_state(state);

    if config.cors.enabled {
        app = app.layer(middleware::cors_layer(&config.cors));
    }

    app
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "dashquery",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        (
            status,
            Json(json!({ "status": "error", "message": self.to_string() })),
        )
            .into_response()
    }
}

/// Start the HTTP server and serve until ctrl-c
pub async fn start_server(addr: SocketAddr, state: ServerState, config: &ServerConfig) -> Result<()> {
    let app = create_app(state, config);

    info!("Starting dashquery server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
