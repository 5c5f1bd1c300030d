// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! courier-worker binary. Spawned and supervised by `courierd`; exits
//! non-zero on fatal error, zero when shut down by signal.

use courier_core::{logging, ConfigPaths, StatusRegistry};
use courier_worker::{entry, NoopExecutor};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let log_file =
        PathBuf::from(std::env::var("COURIER_LOG_FILE").unwrap_or_else(|_| "courier.log".into()));
    let _guard = logging::init(Some(&log_file));

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let paths = ConfigPaths::from_env();
    let settings = entry::WorkerSettings::from_env();
    let registry = StatusRegistry::new();

    tracing::info!(pid = std::process::id(), "worker starting");
    match entry::run(&paths, settings, Arc::new(NoopExecutor), registry, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "worker fatal error");
            ExitCode::FAILURE
        }
    }
}

/// SIGINT/SIGTERM cancel the shutdown token; the dispatcher unwinds from
/// there. No state lives in the handler itself.
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
        tracing::info!("shutdown signal received");
        shutdown.cancel();
    });
}
