// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries the process exit code.
//!
//! `run()` returns `ExitError` instead of calling `std::process::exit()` so
//! that everything it owns (notably the credential cache) is dropped first.

use std::fmt;
use svw_adapters::ExecutionError;
use svw_core::ErrorKind;

/// Exit code when the command was cancelled (SIGINT convention).
const EXIT_CANCELLED: i32 = 130;
/// Exit code when the command hit its timeout (`timeout(1)` convention).
const EXIT_TIMED_OUT: i32 = 124;
/// Exit code when the tool binary could not be started.
const EXIT_NOT_FOUND: i32 = 127;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<ExecutionError> for ExitError {
    fn from(err: ExecutionError) -> Self {
        let code = match (err.kind, err.exit_code) {
            (_, Some(code)) if code != 0 => code,
            (ErrorKind::Cancelled, _) => EXIT_CANCELLED,
            (ErrorKind::Timeout, _) => EXIT_TIMED_OUT,
            (ErrorKind::ToolNotFound, _) => EXIT_NOT_FOUND,
            _ => 1,
        };
        let detail = err.stderr_formatted.trim();
        let message = match (&err.source, detail.is_empty()) {
            (_, false) => format!("{err}\n{detail}"),
            (Some(source), true) => format!("{err}: {source}"),
            (None, true) => err.to_string(),
        };
        Self::new(code, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
