// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker process entry point: configuration, session, dispatch.

use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::executor::JobExecutor;
use crate::session::SessionContext;
use courier_core::{ConfigError, ConfigPaths, StatusRegistry, WorkerConfig};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Fatal worker errors. Anything here means a non-zero exit, which the
/// supervisor observes like any other worker death.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Per-run settings not carried by the configuration files.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Credential name that carries the logical account identity.
    pub identity_key: String,
    pub dispatcher: DispatcherConfig,
}

impl WorkerSettings {
    pub fn from_env() -> Self {
        Self {
            identity_key: std::env::var("COURIER_IDENTITY_KEY")
                .unwrap_or_else(|_| "account".to_string()),
            dispatcher: DispatcherConfig::from_env(),
        }
    }
}

/// Run one worker lifetime.
///
/// Fails fast on configuration problems; otherwise returns only once
/// `shutdown` has fired (or every job has been abandoned). The dispatcher
/// holds the process open indefinitely by design.
pub async fn run<E: JobExecutor + 'static>(
    paths: &ConfigPaths,
    settings: WorkerSettings,
    executor: Arc<E>,
    registry: StatusRegistry,
    shutdown: CancellationToken,
) -> Result<(), WorkerError> {
    let config = WorkerConfig::load(paths)?;
    let session = Arc::new(SessionContext::open(&config, &settings.identity_key));

    registry.update(|s| {
        s.running = true;
        s.session_identity = session.identity().map(str::to_string);
    });

    let WorkerConfig { jobs, messages, prefix, .. } = config;
    tracing::info!(
        jobs = jobs.len(),
        messages = messages.len(),
        concurrency = settings.dispatcher.concurrency,
        "worker configured"
    );

    let dispatcher = Dispatcher::new(settings.dispatcher, executor, registry.clone());
    dispatcher.run(jobs, messages, prefix, session, shutdown).await;

    registry.update(|s| s.running = false);
    tracing::info!("worker stopped");
    Ok(())
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
