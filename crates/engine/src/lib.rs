// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! svw-engine: credential retry orchestration and the `Svn` entry point.

pub mod auth;
pub mod lock;
pub mod svn;

pub use auth::{AuthOrchestrator, AuthPolicy};
pub use lock::{retry_while_locked, LockRetryPolicy};
pub use svn::{ExecOptions, Svn};
