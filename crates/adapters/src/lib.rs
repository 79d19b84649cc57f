// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the tool subprocess, the on-disk credential
//! cache, and the account/prompt/output collaborators.

pub mod accounts;
pub mod credential_cache;
pub mod encoding;
pub mod output;
pub mod prompt;
pub mod subprocess;

pub use accounts::{AccountStore, AccountStoreError, EmptyAccountStore};
pub use credential_cache::{CacheError, CredentialCache};
pub use encoding::EncodingPolicy;
pub use output::{OutputAdapter, TracingOutput};
pub use prompt::{CredentialPrompt, NoPrompt, PromptError};
pub use subprocess::{CommandRequest, ExecutionError, ExecutionResult, SvnExecutor};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use accounts::FakeAccountStore;
#[cfg(any(test, feature = "test-support"))]
pub use output::FakeOutput;
#[cfg(any(test, feature = "test-support"))]
pub use prompt::{FakePrompt, PromptCall};
