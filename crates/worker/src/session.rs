// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared authenticated session context.

use courier_core::{CredentialEntry, WorkerConfig};

/// The single authenticated handle shared read-only by every job task in
/// one worker process. Created once at worker start, dropped at shutdown.
#[derive(Debug)]
pub struct SessionContext {
    identity: Option<String>,
    credentials: Vec<CredentialEntry>,
}

impl SessionContext {
    /// Build the session from the loaded configuration. The identity is the
    /// value of the first credential matching `identity_key`; a session
    /// without one still works, it is just anonymous in the status record.
    pub fn open(config: &WorkerConfig, identity_key: &str) -> Self {
        let identity = config.identity(identity_key).map(str::to_string);
        match &identity {
            Some(id) => tracing::info!(identity = %id, "session identity resolved"),
            None => tracing::warn!(identity_key, "no identity-bearing credential found"),
        }
        Self { identity, credentials: config.credentials.clone() }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Full credential set, for executors that need to authenticate their
    /// interaction surface.
    pub fn credentials(&self) -> &[CredentialEntry] {
        &self.credentials
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
