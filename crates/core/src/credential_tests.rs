// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn debug_masks_password() {
    let cred = Credential::new("alice", "hunter2");
    let rendered = format!("{cred:?}");
    assert!(rendered.contains("alice"));
    assert!(!rendered.contains("hunter2"));

    let account = StoredAccount::new("bob", "s3cret");
    let rendered = format!("{account:?}");
    assert!(rendered.contains("bob"));
    assert!(!rendered.contains("s3cret"));
}

#[yare::parameterized(
    both_present     = { "alice", "pw", true },
    missing_password = { "alice", "",   false },
    missing_username = { "",      "pw", false },
    both_missing     = { "",      "",   false },
)]
fn completeness(username: &str, password: &str, expected: bool) {
    assert_eq!(Credential::new(username, password).is_complete(), expected);
}

#[test]
fn stored_account_converts_to_credential() {
    let cred = StoredAccount::new("carol", "pw1").to_credential();
    assert_eq!(cred.username(), "carol");
    assert_eq!(cred.password(), "pw1");
}
