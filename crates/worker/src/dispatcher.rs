// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-concurrency fan-out of recurring delivery jobs.
//!
//! Admission is a counting semaphore of capacity N. An admitted job task
//! keeps its permit for the rest of the process lifetime — jobs loop
//! forever once running, so N is a hard ceiling and jobs beyond N wait
//! until teardown. The only way a permit comes back is a failed one-time
//! setup, which ends that task alone.

use crate::executor::JobExecutor;
use crate::session::SessionContext;
use courier_core::config::{env_duration_ms, env_parse};
use courier_core::{JobId, StatusRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Tunables for one dispatcher run. All fixed, none adaptive.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum simultaneously active jobs.
    pub concurrency: usize,
    /// Delay imposed after every delivery attempt, success or failure.
    pub pacing: Duration,
    /// Sleep between full passes over the message list.
    pub cycle_wait: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            pacing: Duration::from_secs(10),
            cycle_wait: Duration::from_secs(90),
        }
    }
}

impl DispatcherConfig {
    /// Read tunables from the environment, keeping defaults where unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            concurrency: env_parse("COURIER_CONCURRENCY", defaults.concurrency).max(1),
            pacing: env_duration_ms("COURIER_PACING_MS", defaults.pacing),
            cycle_wait: env_duration_ms("COURIER_CYCLE_WAIT_MS", defaults.cycle_wait),
        }
    }
}

/// Fans jobs out to at most N concurrent tasks and aggregates their
/// results into the status registry.
pub struct Dispatcher<E> {
    config: DispatcherConfig,
    executor: Arc<E>,
    registry: StatusRegistry,
}

impl<E: JobExecutor + 'static> Dispatcher<E> {
    pub fn new(config: DispatcherConfig, executor: Arc<E>, registry: StatusRegistry) -> Self {
        Self { config, executor, registry }
    }

    /// Run every job until `shutdown` fires.
    ///
    /// Returns when all job tasks have ended: normally that means
    /// cancellation, but if every job fails setup the dispatcher also
    /// returns and the worker process winds down (the supervisor treats
    /// that exit like any other).
    pub async fn run(
        &self,
        jobs: Vec<JobId>,
        messages: Vec<String>,
        prefix: String,
        session: Arc<SessionContext>,
        shutdown: CancellationToken,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let messages: Arc<[String]> = messages.into();
        let prefix: Arc<str> = prefix.into();

        tracing::info!(
            jobs = jobs.len(),
            concurrency = self.config.concurrency,
            "dispatcher starting"
        );

        let mut set = JoinSet::new();
        for job in jobs {
            let task = JobTask {
                job,
                executor: Arc::clone(&self.executor),
                registry: self.registry.clone(),
                session: Arc::clone(&session),
                messages: Arc::clone(&messages),
                prefix: Arc::clone(&prefix),
                pacing: self.config.pacing,
                cycle_wait: self.config.cycle_wait,
                shutdown: shutdown.clone(),
            };
            set.spawn(task.run(Arc::clone(&semaphore)));
        }

        while set.join_next().await.is_some() {}
        tracing::info!("dispatcher drained");
    }
}

/// One forever-looping delivery task, bound to a single admitted job slot.
struct JobTask<E> {
    job: JobId,
    executor: Arc<E>,
    registry: StatusRegistry,
    session: Arc<SessionContext>,
    messages: Arc<[String]>,
    prefix: Arc<str>,
    pacing: Duration,
    cycle_wait: Duration,
    shutdown: CancellationToken,
}

impl<E: JobExecutor> JobTask<E> {
    async fn run(self, semaphore: Arc<Semaphore>) {
        // Held until this task returns: admitted jobs never yield their slot.
        // Biased so a permit freed during teardown never admits a new job.
        let _permit = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return,
            permit = semaphore.acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => return,
            },
        };

        let mut channel = match self.executor.open(&self.session, &self.job).await {
            Ok(channel) => channel,
            Err(e) => {
                // Per-job fatal: count it, end this task, leave the rest alone.
                tracing::warn!(job = %self.job, error = %e, "job setup failed, abandoning job");
                self.registry.record_error();
                return;
            }
        };

        self.registry.record_job_opened(&self.job, channel.label());
        tracing::info!(job = %self.job, label = channel.label().unwrap_or("-"), "job opened");

        loop {
            for body in self.messages.iter() {
                if self.shutdown.is_cancelled() {
                    return;
                }
                let full = compose(&self.prefix, body);
                match channel.deliver(&full).await {
                    Ok(()) => {
                        self.registry.record_success(&self.job, channel.label());
                        tracing::info!(job = %self.job, "delivered");
                    }
                    Err(e) => {
                        self.registry.record_error();
                        tracing::warn!(job = %self.job, error = %e, "delivery failed");
                    }
                }
                if !self.sleep_or_shutdown(self.pacing).await {
                    return;
                }
            }
            if !self.sleep_or_shutdown(self.cycle_wait).await {
                return;
            }
        }
    }

    /// False means shutdown fired during the sleep.
    async fn sleep_or_shutdown(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

fn compose(prefix: &str, body: &str) -> String {
    format!("{} {}", prefix, body).trim().to_string()
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
