// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one tool invocation and classifies its outcome.
//!
//! Process completion (exit status plus both drained pipes) races against the
//! timeout timer and the caller's cancellation token inside a single
//! `select!`. Whichever branch wins, the other branch futures are dropped
//! when the `select!` returns, and a timed-out or cancelled child is killed
//! before the error is handed back.

use crate::encoding::{self, EncodingPolicy};
use crate::output::OutputAdapter;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use svw_core::{classify, sanitize_stderr, AuthMode, Credential, ErrorCode, ErrorKind, SvwConfig};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio_util::sync::CancellationToken;

/// Appended to every invocation so the tool never blocks on a terminal prompt.
pub const NON_INTERACTIVE_FLAG: &str = "--non-interactive";

/// Locale forced on the child so stderr/stdout text is stable across hosts.
const UTF8_LOCALE: &str = "en_US.UTF-8";

const MASK: &str = "******";

/// One invocation of the tool.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub cwd: PathBuf,
    pub args: Vec<String>,
    pub credential: Option<Credential>,
    /// `None` runs without a deadline.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
    /// Explicit stdout charset label; skips detection.
    pub encoding: Option<String>,
    /// Echo the command line to the output sink.
    pub log: bool,
}

impl CommandRequest {
    pub fn new<I, S>(cwd: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cwd: cwd.into(),
            args: args.into_iter().map(Into::into).collect(),
            credential: None,
            timeout: None,
            cancel: None,
            encoding: None,
            log: true,
        }
    }

    pub fn credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
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

    pub fn quiet(mut self) -> Self {
        self.log = false;
        self
    }
}

/// Output of a command that exited zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Log prefix derived from the working directory.
    pub context: String,
}

/// A failed invocation.
#[derive(Debug, Error)]
#[error("svn {argument}: {kind}")]
pub struct ExecutionError {
    pub kind: ErrorKind,
    /// Absent when the process never ran to completion.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// `stderr` with the `svn: E123456: ` line prefixes removed.
    pub stderr_formatted: String,
    pub code: Option<ErrorCode>,
    /// The subcommand (`argv[0]`) that failed.
    pub argument: String,
    #[source]
    pub source: Option<std::io::Error>,
}

impl ExecutionError {
    pub fn new(kind: ErrorKind, argument: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            stderr_formatted: String::new(),
            code: None,
            argument: argument.into(),
            source: None,
        }
    }

    /// Build the error for a nonzero exit, classifying `stderr`.
    pub fn from_exit(
        argument: impl Into<String>,
        exit_code: i32,
        stdout: String,
        stderr: String,
    ) -> Self {
        let code = classify(&stderr);
        Self {
            kind: code.map_or(ErrorKind::Unclassified, ErrorKind::from),
            exit_code: Some(exit_code),
            stderr_formatted: sanitize_stderr(&stderr),
            stdout,
            stderr,
            code,
            argument: argument.into(),
            source: None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind == ErrorKind::AuthorizationFailed
    }
}

enum Outcome {
    Completed(std::io::Result<(ExitStatus, Vec<u8>, Vec<u8>)>),
    TimedOut,
    Cancelled,
}

/// Runs the tool binary.
#[derive(Clone)]
pub struct SvnExecutor<O: OutputAdapter> {
    svn_path: PathBuf,
    auth_mode: AuthMode,
    default_encoding: Option<String>,
    detect_encoding: bool,
    output: O,
}

impl<O: OutputAdapter> SvnExecutor<O> {
    pub fn new(config: &SvwConfig, output: O) -> Self {
        Self {
            svn_path: config.svn_path.clone(),
            auth_mode: config.auth_mode(),
            default_encoding: config.default_encoding.clone(),
            detect_encoding: config.detect_encoding,
            output,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Full argv: caller args, the non-interactive flag, then credential flags.
    /// The flags go ahead of a `--` separator so they are never read as operands.
    pub fn build_args(&self, request: &CommandRequest) -> Vec<String> {
        let mut flags = vec![NON_INTERACTIVE_FLAG.to_string()];
        if let Some(cred) = &request.credential {
            flags.push("--username".to_string());
            flags.push(cred.username().to_string());
            if self.auth_mode == AuthMode::PasswordArgument {
                flags.push("--password".to_string());
                flags.push(cred.password().to_string());
            }
        }

        let split = request.args.iter().position(|arg| arg == "--").unwrap_or(request.args.len());
        let mut args = request.args.clone();
        args.splice(split..split, flags);
        args
    }

    pub async fn execute(&self, request: CommandRequest) -> Result<ExecutionResult, ExecutionError> {
        let context = context_tag(&request.cwd);
        let argument = request.args.first().cloned().unwrap_or_default();
        let args = self.build_args(&request);

        if request.log {
            self.output.append_line(&format!("[{}]$ svn {}", context, redact_args(&args).join(" ")));
        }

        if request.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(ExecutionError::new(ErrorKind::Cancelled, argument));
        }

        // A missing cwd also spawns with NotFound; keep it from reading as ToolNotFound
        if !request.cwd.is_dir() {
            let mut err = ExecutionError::new(ErrorKind::Unclassified, argument);
            err.source = Some(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("working directory does not exist: {}", request.cwd.display()),
            ));
            return Err(err);
        }

        let mut cmd = tokio::process::Command::new(&self.svn_path);
        cmd.args(&args)
            .current_dir(&request.cwd)
            .env("LC_ALL", UTF8_LOCALE)
            .env("LANG", UTF8_LOCALE)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| spawn_error(e, &argument, &self.svn_path))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let outcome =
            race(&mut child, stdout, stderr, request.timeout, request.cancel.as_ref()).await;

        let (status, stdout, stderr) = match outcome {
            Outcome::Completed(Ok(done)) => done,
            Outcome::Completed(Err(e)) => {
                kill(&mut child, &argument).await;
                let mut err = ExecutionError::new(ErrorKind::Unclassified, argument);
                err.source = Some(e);
                return Err(err);
            }
            Outcome::TimedOut => {
                kill(&mut child, &argument).await;
                tracing::warn!(command = %argument, timeout = ?request.timeout, "svn command timed out");
                return Err(ExecutionError::new(ErrorKind::Timeout, argument));
            }
            Outcome::Cancelled => {
                kill(&mut child, &argument).await;
                tracing::debug!(command = %argument, "svn command cancelled");
                return Err(ExecutionError::new(ErrorKind::Cancelled, argument));
            }
        };

        let policy = EncodingPolicy {
            explicit: request.encoding.as_deref(),
            detect: self.detect_encoding,
            default: self.default_encoding.as_deref(),
        };
        let stdout = encoding::decode(&stdout, encoding::resolve(&stdout, policy));
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        if !stderr.is_empty() {
            for line in stderr.lines() {
                self.output.append_line(&format!("[{}] {}", context, line));
            }
        }

        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            return Err(ExecutionError::from_exit(argument, exit_code, stdout, stderr));
        }

        Ok(ExecutionResult { exit_code, stdout, stderr, context })
    }

    /// `svn --version --quiet`, trimmed.
    pub async fn version(&self) -> Result<String, ExecutionError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let request = CommandRequest::new(cwd, ["--version", "--quiet"]).quiet();
        let result = self.execute(request).await?;
        Ok(result.stdout.trim().to_string())
    }
}

/// Await exit + both pipes, a timer, and the cancellation token; first wins.
async fn race<R1, R2>(
    child: &mut Child,
    stdout: Option<R1>,
    stderr: Option<R2>,
    timeout: Option<Duration>,
    cancel: Option<&CancellationToken>,
) -> Outcome
where
    R1: AsyncRead + Unpin,
    R2: AsyncRead + Unpin,
{
    let completion = async {
        let (status, out, err) = tokio::join!(child.wait(), read_pipe(stdout), read_pipe(stderr));
        Ok::<_, std::io::Error>((status?, out?, err?))
    };
    let deadline = async {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };

    // Cancellation outranks the timer, which outranks completion.
    tokio::select! {
        biased;
        _ = cancelled => Outcome::Cancelled,
        _ = deadline => Outcome::TimedOut,
        result = completion => Outcome::Completed(result),
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn kill(child: &mut Child, argument: &str) {
    if let Err(e) = child.kill().await {
        tracing::warn!(command = %argument, error = %e, "failed to kill svn process");
    }
}

fn spawn_error(e: std::io::Error, argument: &str, svn_path: &Path) -> ExecutionError {
    let kind = if e.kind() == std::io::ErrorKind::NotFound {
        ErrorKind::ToolNotFound
    } else {
        ErrorKind::Unclassified
    };
    tracing::warn!(path = %svn_path.display(), error = %e, "failed to spawn svn");
    let mut err = ExecutionError::new(kind, argument);
    err.source = Some(e);
    err
}

/// Last path component of the working directory.
pub fn context_tag(cwd: &Path) -> String {
    cwd.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cwd.display().to_string())
}

/// Copy of `args` with every `--password` value masked.
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            redacted.push(MASK.to_string());
            mask_next = false;
            continue;
        }
        mask_next = arg == "--password";
        redacted.push(arg.clone());
    }
    redacted
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
