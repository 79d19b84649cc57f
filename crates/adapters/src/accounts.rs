// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use svw_core::StoredAccount;
use thiserror::Error;

/// Errors from loading stored accounts
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

/// Source of long-term accounts tried before prompting the user.
#[async_trait]
pub trait AccountStore: Clone + Send + Sync + 'static {
    /// Every stored account, in the order they should be tried.
    async fn load(&self) -> Result<Vec<StoredAccount>, AccountStoreError>;
}

/// Store with no accounts.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyAccountStore;

#[async_trait]
impl AccountStore for EmptyAccountStore {
    async fn load(&self) -> Result<Vec<StoredAccount>, AccountStoreError> {
        Ok(Vec::new())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AccountStore, AccountStoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use svw_core::StoredAccount;

    struct FakeAccountState {
        accounts: Vec<StoredAccount>,
        fail: Option<String>,
        loads: usize,
    }

    /// Fake account store with scripted contents
    #[derive(Clone)]
    pub struct FakeAccountStore {
        inner: Arc<Mutex<FakeAccountState>>,
    }

    impl Default for FakeAccountStore {
        fn default() -> Self {
            Self::with_accounts(Vec::new())
        }
    }

    impl FakeAccountStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_accounts(accounts: Vec<StoredAccount>) -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeAccountState { accounts, fail: None, loads: 0 })),
            }
        }

        /// Make every `load` fail with `message`
        pub fn failing(message: &str) -> Self {
            let store = Self::default();
            store.inner.lock().fail = Some(message.to_string());
            store
        }

        /// Number of `load` calls so far
        pub fn loads(&self) -> usize {
            self.inner.lock().loads
        }
    }

    #[async_trait]
    impl AccountStore for FakeAccountStore {
        async fn load(&self) -> Result<Vec<StoredAccount>, AccountStoreError> {
            let mut state = self.inner.lock();
            state.loads += 1;
            match &state.fail {
                Some(message) => Err(AccountStoreError::Unavailable(message.clone())),
                None => Ok(state.accounts.clone()),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAccountStore;
