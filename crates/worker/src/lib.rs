// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! courier-worker: the supervised worker process.
//!
//! Loads configuration, opens one shared session context, and fans the job
//! list out to a bounded pool of forever-looping delivery tasks. The
//! process never finishes on its own; it exits on signal or fatal error,
//! and the daemon decides what happens next.

pub mod dispatcher;
pub mod entry;
pub mod executor;
pub mod session;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use entry::{run, WorkerError};
pub use executor::{DeliverError, ExecuteError, JobChannel, JobExecutor, NoopExecutor};
pub use session::SessionContext;
