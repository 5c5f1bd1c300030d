// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker process supervision.
//!
//! One worker process at a time. The monitor loop spawns it, polls for
//! exit, and respawns after a linear backoff capped at a ceiling. Every
//! exit restarts the worker the same way; the supervisor does not
//! distinguish a clean exit from a crash. A restart budget bounds how
//! many times that can happen before the supervisor parks itself.

use crate::spawn::{self, WorkerCommand};
use courier_core::config::{env_duration_ms, env_parse};
use courier_core::{Clock, StatusRegistry};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// First restart waits this long; attempt n waits n times this.
    pub base_backoff: Duration,
    /// Ceiling on the computed backoff.
    pub max_backoff: Duration,
    /// Restarts allowed before the supervisor parks in `Stopped`.
    pub max_restarts: u64,
    /// How often the monitor checks whether the worker is still alive.
    pub poll_interval: Duration,
    /// How long a signalled worker gets before it is killed outright.
    pub grace: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            base_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            max_restarts: 9999,
            poll_interval: Duration::from_secs(1),
            grace: Duration::from_secs(5),
        }
    }
}

impl SupervisorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_backoff: env_duration_ms("COURIER_BASE_BACKOFF_MS", defaults.base_backoff),
            max_backoff: env_duration_ms("COURIER_MAX_BACKOFF_MS", defaults.max_backoff),
            max_restarts: env_parse("COURIER_MAX_RESTARTS", defaults.max_restarts),
            poll_interval: env_duration_ms("COURIER_POLL_MS", defaults.poll_interval),
            grace: env_duration_ms("COURIER_GRACE_MS", defaults.grace),
        }
    }
}

/// Where the supervisor is in its lifecycle. Observable for tests and
/// logs; transitions happen only inside the monitor loop and `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    NotStarted,
    Starting,
    Running,
    Restarting,
    Stopped,
}

/// Backoff before restart attempt `attempt` (1-based): linear in the
/// attempt number, saturating at the configured ceiling.
pub fn backoff_delay(config: &SupervisorConfig, attempt: u64) -> Duration {
    let base_ms = config.base_backoff.as_millis() as u64;
    Duration::from_millis(base_ms.saturating_mul(attempt)).min(config.max_backoff)
}

/// Supervises a single worker process. Cheap to clone; all clones share
/// the same child handle and state.
#[derive(Clone)]
pub struct Supervisor<C: Clock> {
    config: SupervisorConfig,
    command: WorkerCommand,
    registry: StatusRegistry,
    clock: C,
    state: Arc<Mutex<SupervisorState>>,
    child: Arc<tokio::sync::Mutex<Option<Child>>>,
    shutdown: CancellationToken,
}

impl<C: Clock + 'static> Supervisor<C> {
    pub fn new(
        config: SupervisorConfig,
        command: WorkerCommand,
        registry: StatusRegistry,
        clock: C,
    ) -> Self {
        Self {
            config,
            command,
            registry,
            clock,
            state: Arc::new(Mutex::new(SupervisorState::NotStarted)),
            child: Arc::new(tokio::sync::Mutex::new(None)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.lock()
    }

    /// Launch the monitor loop in the background. Does nothing on a
    /// second call.
    pub fn start(&self) {
        {
            let mut state = self.state.lock();
            if *state != SupervisorState::NotStarted {
                tracing::warn!(state = ?*state, "supervisor already started");
                return;
            }
            *state = SupervisorState::Starting;
        }
        let sup = self.clone();
        tokio::spawn(async move { sup.monitor_loop().await });
    }

    /// Shut the supervisor down: stop restarting, signal the worker, and
    /// wait out the grace period. Safe to call more than once; only the
    /// first call signals the worker.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock();
            if *state == SupervisorState::Stopped {
                tracing::debug!("stop requested but supervisor already stopped");
                return;
            }
            *state = SupervisorState::Stopped;
        }
        self.shutdown.cancel();

        let child = self.child.lock().await.take();
        if let Some(mut child) = child {
            if let Some(pid) = child.id() {
                tracing::info!(pid, "terminating worker");
                if let Err(e) = send_sigterm(pid) {
                    tracing::warn!(pid, error = %e, "failed to signal worker");
                }
            }
            match tokio::time::timeout(self.config.grace, child.wait()).await {
                Ok(Ok(status)) => tracing::info!(%status, "worker terminated"),
                Ok(Err(e)) => tracing::warn!(error = %e, "failed waiting for worker"),
                Err(_) => {
                    tracing::warn!(
                        grace_ms = self.config.grace.as_millis() as u64,
                        "grace period elapsed, killing worker"
                    );
                    if let Err(e) = child.kill().await {
                        tracing::warn!(error = %e, "failed to kill worker");
                    }
                }
            }
        }
        self.registry.worker_exited();
        tracing::info!("supervisor stopped");
    }

    fn set_state(&self, next: SupervisorState) {
        // Never clobber a stop that landed concurrently.
        let mut state = self.state.lock();
        if *state != SupervisorState::Stopped {
            *state = next;
        }
    }

    async fn monitor_loop(self) {
        let mut attempt: u64 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            self.set_state(SupervisorState::Starting);
            match spawn::spawn_worker(&self.command) {
                Ok(mut child) => {
                    let pid = child.id().unwrap_or(0);
                    {
                        // Store under the lock `stop` takes the child from:
                        // a stop that raced the spawn must not leave this
                        // worker running unsignalled.
                        let mut slot = self.child.lock().await;
                        if self.shutdown.is_cancelled() {
                            drop(slot);
                            tracing::info!(pid, "stop raced the spawn, killing fresh worker");
                            if let Err(e) = child.kill().await {
                                tracing::warn!(pid, error = %e, "failed to kill worker");
                            }
                            return;
                        }
                        *slot = Some(child);
                    }
                    self.registry.worker_started(pid);
                    self.set_state(SupervisorState::Running);
                    tracing::info!(pid, "worker started");
                    if !self.watch_worker().await {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to spawn worker");
                }
            }
            if self.shutdown.is_cancelled() {
                return;
            }

            self.registry.worker_exited();
            attempt += 1;
            if attempt > self.config.max_restarts {
                tracing::error!(
                    restarts = self.config.max_restarts,
                    "restart budget exhausted, supervisor parked"
                );
                self.set_state(SupervisorState::Stopped);
                return;
            }

            let delay = backoff_delay(&self.config, attempt);
            self.registry.restart_scheduled(self.clock.epoch_ms());
            self.set_state(SupervisorState::Restarting);
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "scheduling worker restart"
            );
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Poll the worker until it exits. Returns false if shutdown fired
    /// first, or if `stop` already collected the child.
    async fn watch_worker(&self) -> bool {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return false,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
            let mut guard = self.child.lock().await;
            let Some(child) = guard.as_mut() else {
                return false;
            };
            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::warn!(%status, "worker exited");
                    *guard = None;
                    return true;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, "failed to poll worker");
                }
            }
        }
    }
}

fn send_sigterm(pid: u32) -> nix::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
