// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential retry loop around a single tool operation.
//!
//! The operation is retried only on authorization failures. Candidate
//! credentials come from, in order: the caller, each stored account (once
//! each, in store order), then the interactive prompt. When the caller
//! supplies nothing, the first stored account (or failing that, the cached
//! credential for the realm) is used for the first attempt.
//!
//! When the tool reads passwords from its own store, each attempt's
//! credential is staged in the cache before the operation runs and removed
//! again if the attempt fails.

use std::future::Future;
use std::sync::Arc;
use svw_adapters::{AccountStore, CredentialCache, CredentialPrompt, ExecutionError};
use svw_core::{Credential, RealmKey, StoredAccount, SvwConfig};

/// Retry limits and persistence switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Prompt attempts allowed after stored accounts are used up.
    pub prompt_attempts: u32,
    /// Write the working credential to the cache after a success.
    pub save_credentials: bool,
    /// Write each attempt's credential to the cache before running it, for
    /// a tool that only receives `--username`.
    pub stage_credentials: bool,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self { prompt_attempts: 3, save_credentials: true, stage_credentials: false }
    }
}

impl From<&SvwConfig> for AuthPolicy {
    fn from(config: &SvwConfig) -> Self {
        Self {
            prompt_attempts: config.prompt_attempts,
            save_credentials: config.save_credentials,
            stage_credentials: config.use_native_store,
        }
    }
}

/// Drives the authentication state machine for one operation at a time.
pub struct AuthOrchestrator<A, P> {
    accounts: A,
    prompt: P,
    cache: Arc<CredentialCache>,
    policy: AuthPolicy,
}

impl<A: AccountStore, P: CredentialPrompt> AuthOrchestrator<A, P> {
    pub fn new(accounts: A, prompt: P, cache: Arc<CredentialCache>, policy: AuthPolicy) -> Self {
        Self { accounts, prompt, cache, policy }
    }

    pub fn policy(&self) -> AuthPolicy {
        self.policy
    }

    /// Run `op` until it succeeds, fails with a non-authorization error, the
    /// user declines the prompt, or the attempt budget is spent.
    ///
    /// `op` receives the credential for each attempt and is never invoked
    /// concurrently. On exhaustion or decline the last authorization error
    /// is returned.
    pub async fn run<T, F, Fut>(
        &self,
        realm_url: Option<&str>,
        credential: Option<Credential>,
        mut op: F,
    ) -> Result<T, ExecutionError>
    where
        F: FnMut(Option<Credential>) -> Fut,
        Fut: Future<Output = Result<T, ExecutionError>>,
    {
        let accounts = self.load_accounts().await;
        let realm = realm_url.and_then(|url| RealmKey::from_url(url).ok());

        let mut current = credential;
        let mut next_account = 0;
        if current.is_none() {
            if let Some(first) = accounts.first() {
                current = Some(first.to_credential());
                next_account = 1;
            } else if let Some(url) = realm_url {
                current = self.cached(url).await;
            }
        }

        // A staged password needs a realm to land in; without one a new
        // credential could never reach the tool
        let max_attempts = if self.policy.stage_credentials && realm_url.is_none() {
            1
        } else {
            1 + (accounts.len() - next_account) + self.policy.prompt_attempts as usize
        };
        let mut attempt = 0;

        loop {
            attempt += 1;
            let staged = self.stage(realm_url, current.as_ref()).await;
            let outcome = op(current.clone()).await;
            if let (Some(url), true) = (staged, outcome.is_err() || !self.policy.save_credentials) {
                self.unstage(url).await;
            }

            let err = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "authenticated after retry");
                    }
                    if staged.is_none() {
                        self.save(realm_url, current.as_ref()).await;
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_auth_failure() => return Err(e),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                tracing::warn!(attempt, max_attempts, command = %err.argument, "authentication attempts exhausted");
                return Err(err);
            }

            if let Some(account) = accounts.get(next_account) {
                next_account += 1;
                tracing::debug!(attempt, account = %account.account, "retrying with stored account");
                current = Some(account.to_credential());
                continue;
            }

            let previous = current.as_ref().map(|c| c.username().to_string());
            let realm_hint = realm.as_ref().map(RealmKey::as_str).or(realm_url);
            match self.prompt.prompt(realm_hint, previous.as_deref()).await {
                Ok(Some(answer)) => {
                    tracing::debug!(attempt, username = %answer.username(), "retrying with prompted credential");
                    current = Some(answer);
                }
                Ok(None) => {
                    tracing::info!(command = %err.argument, "credential prompt cancelled");
                    return Err(err);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "credential prompt failed");
                    return Err(err);
                }
            }
        }
    }

    async fn load_accounts(&self) -> Vec<StoredAccount> {
        match self.accounts.load().await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load stored accounts");
                Vec::new()
            }
        }
    }

    async fn cached(&self, realm_url: &str) -> Option<Credential> {
        match self.cache.read(realm_url).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(realm_url, error = %e, "failed to read cached credential");
                None
            }
        }
    }

    /// Returns the realm URL the credential was written under.
    async fn stage<'u>(
        &self,
        realm_url: Option<&'u str>,
        credential: Option<&Credential>,
    ) -> Option<&'u str> {
        if !self.policy.stage_credentials {
            return None;
        }
        let (url, cred) = (realm_url?, credential?);
        if !cred.is_complete() {
            return None;
        }
        match self.cache.write(cred.username(), cred.password(), url).await {
            Ok(_) => Some(url),
            Err(e) => {
                tracing::warn!(realm_url = url, error = %e, "failed to stage credential");
                None
            }
        }
    }

    async fn unstage(&self, realm_url: &str) {
        if let Err(e) = self.cache.delete(realm_url).await {
            tracing::warn!(realm_url, error = %e, "failed to remove staged credential");
        }
    }

    async fn save(&self, realm_url: Option<&str>, credential: Option<&Credential>) {
        if !self.policy.save_credentials {
            return;
        }
        let (Some(url), Some(cred)) = (realm_url, credential) else {
            return;
        };
        if !cred.is_complete() {
            return;
        }
        if let Err(e) = self.cache.write(cred.username(), cred.password(), url).await {
            tracing::warn!(realm_url = url, error = %e, "failed to cache credential");
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
