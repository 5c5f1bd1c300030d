// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! courierd: spawns and supervises the worker, serves status over HTTP,
//! and tears both down on SIGINT/SIGTERM.

use courier_core::{logging, StatusRegistry, SystemClock};
use courier_daemon::{server, DaemonConfig, Supervisor, WorkerCommand};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let config = DaemonConfig::from_env();
    let _guard = logging::init(Some(&config.log_file));

    let registry = StatusRegistry::new();
    let supervisor = Supervisor::new(
        config.supervisor.clone(),
        WorkerCommand::resolve(),
        registry.clone(),
        SystemClock,
    );
    supervisor.start();
    tracing::info!(addr = %config.listen_addr, "courier daemon started");

    let serve_shutdown = CancellationToken::new();
    let exit = tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            ExitCode::SUCCESS
        }
        result = server::serve(config.listen_addr, registry.clone(), serve_shutdown.clone()) => {
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "status server failed");
                    ExitCode::FAILURE
                }
            }
        }
    };

    serve_shutdown.cancel();
    supervisor.stop().await;
    tracing::info!("courier daemon stopped");
    exit
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}
