// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Courier daemon: supervises the worker process and serves status over HTTP.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod server;
pub mod spawn;
pub mod supervisor;

pub use config::DaemonConfig;
pub use spawn::WorkerCommand;
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorState};
