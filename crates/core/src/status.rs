// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared observable status record.
//!
//! Each process owns exactly one [`StatusRegistry`]: inside the worker it is
//! written by the dispatcher's job tasks, inside the daemon by the supervisor.
//! All mutation goes through [`StatusRegistry::update`] so a concurrent
//! [`StatusRegistry::snapshot`] can never observe a half-applied record.

use crate::job::JobId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time copy of the observable state, served verbatim by the
/// status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Worker entry point is past configuration loading and dispatching.
    pub running: bool,
    /// Job named by the most recent delivery activity.
    pub last_job: Option<String>,
    /// Label discovered for the most recently touched job, if any.
    pub last_label: Option<String>,
    /// Successful deliveries since this worker process started.
    pub success_count: u64,
    /// Failed setup/delivery attempts since this worker process started.
    pub error_count: u64,
    /// Worker restarts over the whole supervisor lifetime. Never reset.
    pub restart_count: u64,
    /// Wall-clock stamp (epoch ms) of the most recent restart scheduling.
    pub last_restart_ms: Option<u64>,
    /// OS pid of the current worker process.
    pub worker_pid: Option<u32>,
    /// Whether the supervisor believes the worker process is alive.
    pub worker_alive: bool,
    /// Identity resolved from the credential set at worker start.
    pub session_identity: Option<String>,
}

/// Cloneable handle to the process-wide status record.
#[derive(Clone, Default)]
pub struct StatusRegistry {
    inner: Arc<Mutex<StatusSnapshot>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent point-in-time copy of every field.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().clone()
    }

    /// Apply one atomic mutation. The mutator runs under the lock; keep it
    /// small and non-blocking.
    pub fn update(&self, mutate: impl FnOnce(&mut StatusSnapshot)) {
        let mut status = self.inner.lock();
        mutate(&mut status);
    }

    /// One delivery landed: bump the success counter and record which job
    /// and label it belonged to, as a single atomic step.
    pub fn record_success(&self, job: &JobId, label: Option<&str>) {
        self.update(|s| {
            s.success_count += 1;
            s.last_job = Some(job.to_string());
            s.last_label = label.map(str::to_string);
        });
    }

    /// One setup or delivery attempt failed.
    pub fn record_error(&self) {
        self.update(|s| s.error_count += 1);
    }

    /// A job task opened its interaction context; remember it as the most
    /// recently touched job even before anything is delivered.
    pub fn record_job_opened(&self, job: &JobId, label: Option<&str>) {
        self.update(|s| {
            s.last_job = Some(job.to_string());
            s.last_label = label.map(str::to_string);
        });
    }

    /// A fresh worker process is up: publish its pid and reset the
    /// per-worker counters. `restart_count` deliberately survives.
    pub fn worker_started(&self, pid: u32) {
        self.update(|s| {
            s.worker_pid = Some(pid);
            s.worker_alive = true;
            s.success_count = 0;
            s.error_count = 0;
        });
    }

    /// The worker process was observed to have exited.
    pub fn worker_exited(&self) {
        self.update(|s| s.worker_alive = false);
    }

    /// A restart was scheduled after an observed exit.
    pub fn restart_scheduled(&self, now_ms: u64) {
        self.update(|s| {
            s.restart_count += 1;
            s.last_restart_ms = Some(now_ms);
        });
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
