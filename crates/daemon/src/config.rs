// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, read from the environment at startup.

use crate::supervisor::SupervisorConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Address the status endpoint binds to.
    pub listen_addr: SocketAddr,
    /// Best-effort log file next to the console sink.
    pub log_file: PathBuf,
    pub supervisor: SupervisorConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_file: PathBuf::from("courier.log"),
            supervisor: SupervisorConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: std::env::var("COURIER_LISTEN_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.listen_addr),
            log_file: std::env::var("COURIER_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            supervisor: SupervisorConfig::from_env(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
