// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flat-file configuration source for one worker run.
//!
//! Four inputs, all read once at worker start: a JSON credentials file, a
//! job list and a message list (one entry per line), and a prefix string.
//! Loading fails fast when the credential set or the job list comes up
//! empty; everything else is the worker's problem at delivery time.

use crate::job::JobId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// One named credential. Extra fields in the source file are ignored so the
/// file can carry whatever shape the session backend exports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialEntry {
    pub name: String,
    pub value: String,
}

/// Where the four input files live.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub credentials: PathBuf,
    pub jobs: PathBuf,
    pub messages: PathBuf,
    pub prefix: PathBuf,
}

impl ConfigPaths {
    /// Conventional file names under a single configuration directory.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            credentials: dir.join("credentials.json"),
            jobs: dir.join("targets.txt"),
            messages: dir.join("messages.txt"),
            prefix: dir.join("prefix.txt"),
        }
    }

    /// Resolve the configuration directory: `COURIER_CONFIG_DIR` or cwd.
    pub fn from_env() -> Self {
        let dir = std::env::var("COURIER_CONFIG_DIR").unwrap_or_else(|_| ".".to_string());
        Self::under(dir)
    }
}

/// Validated configuration for one worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub credentials: Vec<CredentialEntry>,
    pub jobs: Vec<JobId>,
    pub messages: Vec<String>,
    pub prefix: String,
}

impl WorkerConfig {
    /// Load and validate all four inputs.
    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let credentials = load_credentials(&paths.credentials)?;
        if credentials.is_empty() {
            return Err(ConfigError::NoCredentials);
        }

        let jobs: Vec<JobId> =
            read_lines(&paths.jobs)?.into_iter().map(JobId::from).collect();
        if jobs.is_empty() {
            return Err(ConfigError::NoJobs);
        }

        let messages = read_lines(&paths.messages)?;
        let prefix = read_file(&paths.prefix)?.trim().to_string();

        Ok(Self { credentials, jobs, messages, prefix })
    }

    /// Value of the first credential whose name matches the identity key.
    pub fn identity(&self, key: &str) -> Option<&str> {
        self.credentials
            .iter()
            .find(|c| c.name == key)
            .map(|c| c.value.as_str())
    }
}

/// Parse credentials, silently dropping entries that lack a usable
/// name/value pair rather than rejecting the whole file.
fn load_credentials(path: &Path) -> Result<Vec<CredentialEntry>, ConfigError> {
    let raw = read_file(path)?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .map_err(|source| ConfigError::Credentials { path: path.to_path_buf(), source })?;

    Ok(entries
        .into_iter()
        .filter_map(|v| serde_json::from_value::<CredentialEntry>(v).ok())
        .filter(|c| !c.name.is_empty() && !c.value.is_empty())
        .collect())
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })
}

/// Non-empty trimmed lines, in file order.
fn read_lines(path: &Path) -> Result<Vec<String>, ConfigError> {
    Ok(read_file(path)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Configuration errors. `NoCredentials` and `NoJobs` are the fail-fast
/// conditions the worker entry point turns into a fatal exit.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credentials at {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no valid credentials found")]
    NoCredentials,

    #[error("no jobs provided")]
    NoJobs,
}

/// Parse an environment variable, falling back to the default when unset
/// or unparsable.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Millisecond-valued environment knob.
pub fn env_duration_ms(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
