// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use svw_core::Credential;
use thiserror::Error;

/// Errors from an interactive credential prompt
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("prompt unavailable: {0}")]
    Unavailable(String),
}

/// Asks the user for a credential after stored accounts are exhausted.
#[async_trait]
pub trait CredentialPrompt: Clone + Send + Sync + 'static {
    /// `Ok(None)` means the user declined.
    async fn prompt(
        &self,
        realm: Option<&str>,
        previous_username: Option<&str>,
    ) -> Result<Option<Credential>, PromptError>;
}

/// Prompt that always declines; used where no user is present.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPrompt;

#[async_trait]
impl CredentialPrompt for NoPrompt {
    async fn prompt(
        &self,
        _realm: Option<&str>,
        _previous_username: Option<&str>,
    ) -> Result<Option<Credential>, PromptError> {
        Ok(None)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CredentialPrompt, PromptError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use svw_core::Credential;

    /// Recorded prompt invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PromptCall {
        pub realm: Option<String>,
        pub previous_username: Option<String>,
    }

    enum Scripted {
        Answer(Option<Credential>),
        Fail(String),
    }

    #[derive(Default)]
    struct FakePromptState {
        responses: VecDeque<Scripted>,
        calls: Vec<PromptCall>,
    }

    /// Fake prompt replaying scripted answers; declines once the script runs out
    #[derive(Clone, Default)]
    pub struct FakePrompt {
        inner: Arc<Mutex<FakePromptState>>,
    }

    impl FakePrompt {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a credential answer
        pub fn answer(self, username: &str, password: &str) -> Self {
            self.inner
                .lock()
                .responses
                .push_back(Scripted::Answer(Some(Credential::new(username, password))));
            self
        }

        /// Queue a decline
        pub fn decline(self) -> Self {
            self.inner.lock().responses.push_back(Scripted::Answer(None));
            self
        }

        /// Queue a prompt failure
        pub fn fail(self, message: &str) -> Self {
            self.inner.lock().responses.push_back(Scripted::Fail(message.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<PromptCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl CredentialPrompt for FakePrompt {
        async fn prompt(
            &self,
            realm: Option<&str>,
            previous_username: Option<&str>,
        ) -> Result<Option<Credential>, PromptError> {
            let mut state = self.inner.lock();
            state.calls.push(PromptCall {
                realm: realm.map(str::to_string),
                previous_username: previous_username.map(str::to_string),
            });
            match state.responses.pop_front() {
                Some(Scripted::Answer(answer)) => Ok(answer),
                Some(Scripted::Fail(message)) => Err(PromptError::Unavailable(message)),
                None => Ok(None),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePrompt, PromptCall};
