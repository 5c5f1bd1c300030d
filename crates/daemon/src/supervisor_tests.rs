// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use courier_core::{FakeClock, SystemClock};
use std::time::Instant;

fn fast(max_restarts: u64) -> SupervisorConfig {
    SupervisorConfig {
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(40),
        max_restarts,
        poll_interval: Duration::from_millis(10),
        grace: Duration::from_millis(500),
    }
}

fn sh(script: &str) -> WorkerCommand {
    let mut command = WorkerCommand::new("/bin/sh");
    command.args = vec!["-c".to_string(), script.to_string()];
    command
}

async fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn kill_hard(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), Signal::SIGKILL).unwrap();
}

#[yare::parameterized(
    first_attempt = { 1, 10 },
    second_attempt = { 2, 20 },
    at_the_cap = { 4, 40 },
    beyond_the_cap = { 5, 40 },
    far_beyond_the_cap = { 1_000, 40 },
)]
fn backoff_is_linear_then_capped(attempt: u64, expect_ms: u64) {
    let config = fast(9999);
    assert_eq!(backoff_delay(&config, attempt), Duration::from_millis(expect_ms));
}

#[tokio::test]
async fn healthy_worker_reports_alive_and_stops_cleanly() {
    let registry = StatusRegistry::new();
    let sup = Supervisor::new(fast(9999), sh("sleep 30"), registry.clone(), SystemClock);
    sup.start();

    wait_for("worker up", || registry.snapshot().worker_alive).await;
    let s = registry.snapshot();
    assert!(s.worker_pid.is_some());
    assert_eq!(s.restart_count, 0);

    sup.stop().await;
    assert_eq!(sup.state(), SupervisorState::Stopped);
    assert!(!registry.snapshot().worker_alive);
}

#[tokio::test]
async fn crash_looping_worker_is_restarted_with_stamps() {
    let registry = StatusRegistry::new();
    let clock = FakeClock::at_epoch_ms(5_000);
    let sup = Supervisor::new(fast(9999), sh("exit 1"), registry.clone(), clock);
    sup.start();

    wait_for("two restarts", || registry.snapshot().restart_count >= 2).await;
    assert_eq!(registry.snapshot().last_restart_ms, Some(5_000));

    sup.stop().await;
}

#[tokio::test]
async fn killed_worker_is_replaced_with_a_new_pid() {
    let registry = StatusRegistry::new();
    let sup = Supervisor::new(fast(9999), sh("sleep 30"), registry.clone(), SystemClock);
    sup.start();

    wait_for("worker up", || registry.snapshot().worker_alive).await;
    let first = registry.snapshot().worker_pid.unwrap();
    kill_hard(first);

    wait_for("replacement worker", || {
        let s = registry.snapshot();
        s.restart_count == 1 && s.worker_alive && s.worker_pid != Some(first)
    })
    .await;

    sup.stop().await;
}

#[tokio::test]
async fn restart_budget_exhaustion_parks_the_supervisor() {
    let registry = StatusRegistry::new();
    let sup = Supervisor::new(fast(2), sh("exit 1"), registry.clone(), SystemClock);
    sup.start();

    wait_for("parked", || sup.state() == SupervisorState::Stopped).await;
    let s = registry.snapshot();
    assert_eq!(s.restart_count, 2, "every allowed restart was attempted");
    assert!(!s.worker_alive);
}

#[tokio::test]
async fn spawn_failure_burns_the_budget_like_an_exit() {
    let registry = StatusRegistry::new();
    let command = WorkerCommand::new("/nonexistent/courier-worker");
    let sup = Supervisor::new(fast(1), command, registry.clone(), SystemClock);
    sup.start();

    wait_for("parked", || sup.state() == SupervisorState::Stopped).await;
    assert_eq!(registry.snapshot().restart_count, 1);
    assert!(registry.snapshot().worker_pid.is_none());
}

#[tokio::test]
async fn stop_is_idempotent() {
    let registry = StatusRegistry::new();
    let sup = Supervisor::new(fast(9999), sh("sleep 30"), registry.clone(), SystemClock);
    sup.start();
    wait_for("worker up", || registry.snapshot().worker_alive).await;

    sup.stop().await;
    let count = registry.snapshot().restart_count;
    sup.stop().await;

    assert_eq!(registry.snapshot().restart_count, count);
    assert_eq!(sup.state(), SupervisorState::Stopped);
}

fn process_gone(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    match kill(Pid::from_raw(pid), None) {
        Err(_) => true,
        // Still signallable; a reaped-but-lingering zombie counts as gone.
        Ok(()) => std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .map(|stat| stat.contains(") Z"))
            .unwrap_or(true),
    }
}

#[tokio::test]
async fn stop_racing_the_first_spawn_leaves_no_worker_behind() {
    for round in 0..10 {
        let pid_file = std::env::temp_dir()
            .join(format!("courier-stop-race-{}-{round}", std::process::id()));
        let _ = std::fs::remove_file(&pid_file);
        let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());

        let registry = StatusRegistry::new();
        let sup = Supervisor::new(fast(9999), sh(&script), registry.clone(), SystemClock);
        sup.start();
        sup.stop().await;

        // Give a worker that won the spawn race time to write its pid.
        tokio::time::sleep(Duration::from_millis(300)).await;
        if let Ok(raw) = std::fs::read_to_string(&pid_file) {
            let pid: i32 = raw.trim().parse().unwrap();
            wait_for("raced worker to die", || process_gone(pid)).await;
        }
        let _ = std::fs::remove_file(&pid_file);
    }
}

#[tokio::test]
async fn second_start_is_a_no_op() {
    let registry = StatusRegistry::new();
    let sup = Supervisor::new(fast(9999), sh("sleep 30"), registry.clone(), SystemClock);
    sup.start();
    wait_for("worker up", || registry.snapshot().worker_alive).await;
    let pid = registry.snapshot().worker_pid;

    sup.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let s = registry.snapshot();
    assert_eq!(s.worker_pid, pid, "no second worker was spawned");
    assert_eq!(s.restart_count, 0);

    sup.stop().await;
}
