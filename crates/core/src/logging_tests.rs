// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn unopenable_log_file_degrades_to_console_only() {
    // Parent of the requested log path is a regular file, so the sink can
    // never be created.
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let guard = init(Some(&blocker.join("courier.log")));
    assert!(guard.is_none(), "file sink must be skipped, not fatal");
}

#[test]
fn writable_log_file_attaches_the_file_sink() {
    let dir = TempDir::new().unwrap();
    let guard = init(Some(&dir.path().join("courier.log")));
    assert!(guard.is_some());
}
