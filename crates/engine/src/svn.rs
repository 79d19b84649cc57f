// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point tying the executor, credential cache, and retry loop together.

use crate::auth::{AuthOrchestrator, AuthPolicy};
use std::path::Path;
use std::sync::Arc;
use svw_adapters::{
    AccountStore, CacheError, CommandRequest, CredentialCache, CredentialPrompt, ExecutionError,
    ExecutionResult, OutputAdapter, SvnExecutor,
};
use svw_core::{Credential, SvwConfig};
use tokio_util::sync::CancellationToken;

/// Per-call settings for [`Svn::exec`].
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Repository URL the credential realm is derived from.
    pub realm_url: Option<String>,
    pub credential: Option<Credential>,
    pub cancel: Option<CancellationToken>,
    /// Stdout charset label; overrides detection.
    pub encoding: Option<String>,
}

impl ExecOptions {
    pub fn realm(mut self, url: impl Into<String>) -> Self {
        self.realm_url = Some(url.into());
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }
}

pub struct Svn<O: OutputAdapter, A: AccountStore, P: CredentialPrompt> {
    config: SvwConfig,
    executor: SvnExecutor<O>,
    cache: Arc<CredentialCache>,
    auth: AuthOrchestrator<A, P>,
}

impl<O, A, P> Svn<O, A, P>
where
    O: OutputAdapter,
    A: AccountStore,
    P: CredentialPrompt,
{
    /// Build with the cache directory from `config` (or the platform default).
    pub fn new(config: SvwConfig, output: O, accounts: A, prompt: P) -> Result<Self, CacheError> {
        let cache = CredentialCache::from_config(&config)?;
        Ok(Self::with_cache(config, output, accounts, prompt, cache))
    }

    pub fn with_cache(
        config: SvwConfig,
        output: O,
        accounts: A,
        prompt: P,
        cache: CredentialCache,
    ) -> Self {
        let cache = Arc::new(cache);
        let executor = SvnExecutor::new(&config, output);
        let auth =
            AuthOrchestrator::new(accounts, prompt, Arc::clone(&cache), AuthPolicy::from(&config));
        Self { config, executor, cache, auth }
    }

    pub fn config(&self) -> &SvwConfig {
        &self.config
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    pub fn executor(&self) -> &SvnExecutor<O> {
        &self.executor
    }

    /// Run one tool command, retrying with other credentials on
    /// authorization failures.
    pub async fn exec<I, S>(
        &self,
        cwd: impl AsRef<Path>,
        args: I,
        options: ExecOptions,
    ) -> Result<ExecutionResult, ExecutionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = self.request(cwd.as_ref(), args, &options);
        let executor = &self.executor;
        self.auth
            .run(options.realm_url.as_deref(), options.credential, move |credential| {
                executor.execute(template.clone().credential(credential))
            })
            .await
    }

    /// Run one tool command with the given credential and no retries.
    pub async fn exec_once<I, S>(
        &self,
        cwd: impl AsRef<Path>,
        args: I,
        options: ExecOptions,
    ) -> Result<ExecutionResult, ExecutionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = self.request(cwd.as_ref(), args, &options).credential(options.credential);
        self.executor.execute(request).await
    }

    /// Installed tool version.
    pub async fn version(&self) -> Result<String, ExecutionError> {
        self.executor.version().await
    }

    /// Remove every credential file this instance cached.
    pub fn dispose(&self) {
        self.cache.dispose();
    }

    fn request<I, S>(&self, cwd: &Path, args: I, options: &ExecOptions) -> CommandRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = CommandRequest::new(cwd, args).timeout(self.config.timeout());
        if let Some(token) = &options.cancel {
            request = request.cancel(token.clone());
        }
        if let Some(label) = &options.encoding {
            request = request.encoding(label.clone());
        }
        if !self.config.log_commands {
            request = request.quiet();
        }
        request
    }
}

#[cfg(test)]
#[path = "svn_tests.rs"]
mod tests;
