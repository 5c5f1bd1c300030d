// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker process spawning.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Fully resolved invocation for one worker process.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment on top of the inherited one.
    pub env: Vec<(String, String)>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new(), env: Vec::new() }
    }

    /// Locate the worker binary the way the daemon itself was found.
    pub fn resolve() -> Self {
        Self::new(find_worker_binary())
    }
}

/// Resolution order: explicit override, then a sibling of the running
/// daemon binary, then whatever `PATH` turns up.
pub fn find_worker_binary() -> PathBuf {
    if let Ok(path) = std::env::var("COURIER_WORKER_BIN") {
        return PathBuf::from(path);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("courier-worker");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("courier-worker")
}

/// Spawn one worker. The child is killed if its handle is dropped, so a
/// panicking supervisor cannot leak a process.
pub fn spawn_worker(command: &WorkerCommand) -> std::io::Result<Child> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .kill_on_drop(true);
    tracing::debug!(program = %command.program.display(), "spawning worker");
    cmd.spawn()
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
