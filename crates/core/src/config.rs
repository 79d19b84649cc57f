// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration.
//!
//! Values come from an optional TOML file, then `SVW_*` environment
//! variables override individual fields.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How credentials reach the tool on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `--username u --password p`
    #[default]
    PasswordArgument,
    /// `--username u` only; the tool reads the password from its native store.
    NativeStore,
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Every option the runner recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SvwConfig {
    /// Tool executable (name resolved through `PATH`, or an absolute path).
    pub svn_path: PathBuf,
    /// Per-command timeout; `0` disables it.
    pub timeout_secs: u64,
    /// Delegate password lookup to the OS-native store instead of passing it.
    pub use_native_store: bool,
    /// Persist credentials to the cache after a successful authenticated run.
    pub save_credentials: bool,
    /// Encoding label used when detection is off or inconclusive.
    pub default_encoding: Option<String>,
    /// Sniff stdout encoding before decoding.
    pub detect_encoding: bool,
    /// Interactive prompt attempts after stored accounts run out.
    pub prompt_attempts: u32,
    /// Credential cache directory; platform default when unset.
    pub cache_dir: Option<PathBuf>,
    /// Echo each command line to the output sink.
    pub log_commands: bool,
}

impl Default for SvwConfig {
    fn default() -> Self {
        Self {
            svn_path: PathBuf::from("svn"),
            timeout_secs: 60,
            use_native_store: false,
            save_credentials: true,
            default_encoding: None,
            detect_encoding: true,
            prompt_attempts: 3,
            cache_dir: None,
            log_commands: true,
        }
    }
}

impl SvwConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Load from `path` (if given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
                Self::from_toml(&text, path)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `SVW_*` environment variables. Unparseable
    /// values are ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Some(path) = env_string("SVW_SVN_PATH") {
            self.svn_path = PathBuf::from(path);
        }
        if let Some(secs) = env_parse::<u64>("SVW_TIMEOUT_SECS") {
            self.timeout_secs = secs;
        }
        if let Some(flag) = env_parse::<bool>("SVW_USE_NATIVE_STORE") {
            self.use_native_store = flag;
        }
        if let Some(flag) = env_parse::<bool>("SVW_SAVE_CREDENTIALS") {
            self.save_credentials = flag;
        }
        if let Some(label) = env_string("SVW_DEFAULT_ENCODING") {
            self.default_encoding = Some(label);
        }
        if let Some(dir) = env_string("SVW_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn auth_mode(&self) -> AuthMode {
        if self.use_native_store {
            AuthMode::NativeStore
        } else {
            AuthMode::PasswordArgument
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
