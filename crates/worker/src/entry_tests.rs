// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::executor::{DeliverError, ExecuteError, JobChannel};
use async_trait::async_trait;
use courier_core::JobId;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn settings() -> WorkerSettings {
    WorkerSettings {
        identity_key: "account".to_string(),
        dispatcher: DispatcherConfig {
            concurrency: 2,
            pacing: Duration::from_millis(5),
            cycle_wait: Duration::from_millis(5),
        },
    }
}

fn write_config(dir: &TempDir, jobs: &str) -> ConfigPaths {
    let paths = ConfigPaths::under(dir.path());
    fs::write(&paths.credentials, r#"[{"name": "account", "value": "acct-7"}]"#).unwrap();
    fs::write(&paths.jobs, jobs).unwrap();
    fs::write(&paths.messages, "hi\n").unwrap();
    fs::write(&paths.prefix, "").unwrap();
    paths
}

/// Cancels the run after the first delivery.
struct OneShotExecutor {
    shutdown: CancellationToken,
}

#[async_trait]
impl JobExecutor for OneShotExecutor {
    async fn open(
        &self,
        _session: &SessionContext,
        _job: &JobId,
    ) -> Result<Box<dyn JobChannel>, ExecuteError> {
        Ok(Box::new(OneShotChannel { shutdown: self.shutdown.clone() }))
    }
}

struct OneShotChannel {
    shutdown: CancellationToken,
}

#[async_trait]
impl JobChannel for OneShotChannel {
    fn label(&self) -> Option<&str> {
        None
    }

    async fn deliver(&mut self, _body: &str) -> Result<(), DeliverError> {
        self.shutdown.cancel();
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn run_publishes_identity_and_stops_on_cancel() {
    let dir = TempDir::new().unwrap();
    let paths = write_config(&dir, "t1\n");
    let registry = StatusRegistry::new();
    let shutdown = CancellationToken::new();
    let executor = Arc::new(OneShotExecutor { shutdown: shutdown.clone() });

    run(&paths, settings(), executor, registry.clone(), shutdown).await.unwrap();

    let s = registry.snapshot();
    assert_eq!(s.session_identity.as_deref(), Some("acct-7"));
    assert!(!s.running, "running cleared once the dispatcher drains");
    assert_eq!(s.success_count, 1);
}

#[tokio::test]
async fn empty_job_list_is_fatal() {
    let dir = TempDir::new().unwrap();
    let paths = write_config(&dir, "\n");
    let shutdown = CancellationToken::new();
    let executor = Arc::new(OneShotExecutor { shutdown: shutdown.clone() });

    let err = run(&paths, settings(), executor, StatusRegistry::new(), shutdown)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Config(ConfigError::NoJobs)));
}

#[tokio::test]
async fn unreadable_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let paths = ConfigPaths::under(dir.path().join("nope"));
    let shutdown = CancellationToken::new();
    let executor = Arc::new(OneShotExecutor { shutdown: shutdown.clone() });

    let err = run(&paths, settings(), executor, StatusRegistry::new(), shutdown)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Config(ConfigError::Read { .. })));
}
