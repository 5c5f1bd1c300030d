// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use courier_core::JobId;

fn config_with(credentials: Vec<CredentialEntry>) -> WorkerConfig {
    WorkerConfig {
        credentials,
        jobs: vec![JobId::new("t1")],
        messages: vec!["m".to_string()],
        prefix: String::new(),
    }
}

fn cred(name: &str, value: &str) -> CredentialEntry {
    CredentialEntry { name: name.to_string(), value: value.to_string() }
}

#[test]
fn identity_comes_from_first_matching_credential() {
    let config = config_with(vec![
        cred("token", "x"),
        cred("account", "first"),
        cred("account", "second"),
    ]);
    let session = SessionContext::open(&config, "account");
    assert_eq!(session.identity(), Some("first"));
    assert_eq!(session.credentials().len(), 3);
}

#[test]
fn missing_identity_is_not_fatal() {
    let config = config_with(vec![cred("token", "x")]);
    let session = SessionContext::open(&config, "account");
    assert_eq!(session.identity(), None);
}
