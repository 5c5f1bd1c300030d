// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging bootstrap shared by the daemon and worker binaries.
//!
//! Every state transition is logged to the console and, best-effort, to a
//! persistent file. The file sink is optional at runtime: if it cannot be
//! set up the process keeps going with console logging only.

use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber.
///
/// Returns the appender guard when a file sink was attached; the caller
/// must hold it for the life of the process so buffered lines get flushed.
pub fn init(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer();

    let (file_layer, guard) = match log_file.and_then(file_writer) {
        Some((writer, guard)) => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: a second call (tests, embedding) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();

    guard
}

/// Best-effort file sink. `None` when the file cannot be opened; the
/// caller keeps the console layer either way.
fn file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "courier.log".to_string());
    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            // No subscriber is installed yet, so this can only go to stderr.
            eprintln!(
                "log file {} unavailable ({e}); continuing with console logging only",
                path.display()
            );
            return None;
        }
    };
    Some(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
