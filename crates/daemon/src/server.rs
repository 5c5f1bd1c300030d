// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status endpoint. Two routes: a fixed liveness line at `/` and the
//! full status snapshot as JSON at `/status`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use courier_core::{StatusRegistry, StatusSnapshot};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

pub fn router(registry: StatusRegistry) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/status", get(status))
        .with_state(registry)
}

async fn liveness() -> &'static str {
    "courier daemon is running"
}

async fn status(State(registry): State<StatusRegistry>) -> Json<StatusSnapshot> {
    Json(registry.snapshot())
}

/// Serve until `shutdown` fires. Binds eagerly so a bad address fails
/// the daemon at startup instead of silently serving nothing.
pub async fn serve(
    addr: SocketAddr,
    registry: StatusRegistry,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "status endpoint listening");
    axum::serve(listener, router(registry))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
