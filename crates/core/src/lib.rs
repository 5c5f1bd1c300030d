// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! courier-core: types shared by the courier daemon and worker processes.

pub mod clock;
pub mod config;
pub mod job;
pub mod logging;
pub mod status;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, ConfigPaths, CredentialEntry, WorkerConfig};
pub use job::JobId;
pub use status::{StatusRegistry, StatusSnapshot};
