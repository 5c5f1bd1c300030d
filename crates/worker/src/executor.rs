// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job execution seam.
//!
//! The concrete automation against the remote target lives behind
//! [`JobExecutor`]: the dispatcher only knows that a job can be opened once
//! and then delivered to repeatedly, that either step may take seconds,
//! and that delivery may fail transiently.

use crate::session::SessionContext;
use async_trait::async_trait;
use courier_core::JobId;
use thiserror::Error;

/// Failure to set up a job's interaction context. Fatal to that one job's
/// task; other jobs are unaffected.
#[derive(Debug, Error)]
#[error("failed to open job {job}: {reason}")]
pub struct ExecuteError {
    pub job: JobId,
    pub reason: String,
}

/// Failure of a single delivery attempt. Never fatal: the job loop counts
/// it and moves on to the next message.
#[derive(Debug, Error)]
pub enum DeliverError {
    /// The expected interaction point could not be located on the target.
    #[error("delivery endpoint not found")]
    EndpointNotFound,

    /// Anything transient underneath (navigation, network, timeout).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Performs the multi-step interaction for one job.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// One-time setup: open the interaction context for `job` on the shared
    /// session.
    async fn open(
        &self,
        session: &SessionContext,
        job: &JobId,
    ) -> Result<Box<dyn JobChannel>, ExecuteError>;
}

/// An opened interaction context for one job.
#[async_trait]
pub trait JobChannel: Send {
    /// Human-readable label discovered during setup (e.g. the name of the
    /// conversation behind the job id), if any.
    fn label(&self) -> Option<&str>;

    /// Attempt one delivery.
    async fn deliver(&mut self, body: &str) -> Result<(), DeliverError>;
}

/// Executor that accepts every delivery and only logs it.
///
/// Default wiring of the worker binary; the real automation adapter is
/// injected in its place. Also handy in tests that exercise dispatcher
/// behavior rather than delivery outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExecutor;

#[async_trait]
impl JobExecutor for NoopExecutor {
    async fn open(
        &self,
        _session: &SessionContext,
        job: &JobId,
    ) -> Result<Box<dyn JobChannel>, ExecuteError> {
        tracing::debug!(job = %job, "noop executor opened job");
        Ok(Box::new(NoopChannel { job: job.clone() }))
    }
}

struct NoopChannel {
    job: JobId,
}

#[async_trait]
impl JobChannel for NoopChannel {
    fn label(&self) -> Option<&str> {
        None
    }

    async fn deliver(&mut self, body: &str) -> Result<(), DeliverError> {
        tracing::info!(job = %self.job, bytes = body.len(), "noop delivery");
        Ok(())
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
