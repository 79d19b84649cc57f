// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! svw-core: credential, realm, error, and configuration types shared by the
//! subprocess runner and the auth retry engine.

pub mod classify;
pub mod config;
pub mod credential;
pub mod error;
pub mod realm;

pub use classify::{classify, sanitize_stderr};
pub use config::{AuthMode, ConfigError, SvwConfig};
pub use credential::{Credential, StoredAccount};
pub use error::{ErrorCode, ErrorKind};
pub use realm::{RealmError, RealmKey};
