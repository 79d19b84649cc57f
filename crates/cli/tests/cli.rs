// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests of the `svw` binary against a shell script standing in
//! for `svn`.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

/// Echoes its arguments; `--version` prints a version string.
const ECHO_SVN: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "1.14.3 (r1914484)"; exit 0; fi
echo "args: $*"
"#;

const NOT_A_WC_SVN: &str = r#"#!/bin/sh
echo "svn: E155007: '/tmp/x' is not a working copy" >&2
exit 3
"#;

const AUTH_FAIL_SVN: &str = r#"#!/bin/sh
echo "svn: E170001: Authorization failed" >&2
exit 1
"#;

struct Sandbox {
    dir: TempDir,
    svn: PathBuf,
}

impl Sandbox {
    fn new(script: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let svn = dir.path().join("fake-svn");
        std::fs::write(&svn, script).unwrap();
        std::fs::set_permissions(&svn, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::create_dir(dir.path().join("wc")).unwrap();
        Self { dir, svn }
    }

    fn wc(&self) -> PathBuf {
        self.dir.path().join("wc")
    }

    fn cache(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// `svw` with the fake tool configured through the environment.
    fn svw(&self) -> Command {
        let mut cmd = Command::cargo_bin("svw").unwrap();
        cmd.env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .env("HOME", self.dir.path())
            .env("SVW_SVN_PATH", &self.svn)
            .env("SVW_CACHE_DIR", self.cache())
            .env("SVW_LOG", "warn")
            .arg("--cwd")
            .arg(self.wc());
        cmd
    }
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout).unwrap()
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("svw.toml");
    std::fs::write(&path, body).unwrap();
    path
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn passes_arguments_and_prints_stdout() {
    let sb = Sandbox::new(ECHO_SVN);
    let out = stdout_of(sb.svw().args(["--", "info", "--xml"]));
    assert_eq!(out, "args: info --xml --non-interactive\n");
}

#[test]
fn check_prints_version() {
    let sb = Sandbox::new(ECHO_SVN);
    let out = stdout_of(sb.svw().arg("--check"));
    assert_eq!(out, "svn 1.14.3 (r1914484)\n");
}

#[test]
fn tool_exit_code_is_propagated() {
    let sb = Sandbox::new(NOT_A_WC_SVN);
    let output = sb.svw().args(["--", "status"]).output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("svn status: not a working copy"), "stderr: {stderr}");
    assert!(stderr.contains("'/tmp/x' is not a working copy"), "stderr: {stderr}");
}

#[test]
fn auth_failure_without_terminal_does_not_prompt() {
    let sb = Sandbox::new(AUTH_FAIL_SVN);
    let output = sb
        .svw()
        .args(["--realm", "https://svn.example.com/repo", "--", "update"])
        .write_stdin("")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("authorization failed"), "stderr: {stderr}");
    assert!(!sb.cache().exists() || std::fs::read_dir(sb.cache()).unwrap().next().is_none());
}

#[test]
fn missing_tool_exits_127() {
    let sb = Sandbox::new(ECHO_SVN);
    let output = sb
        .svw()
        .env("SVW_SVN_PATH", sb.dir.path().join("no-such-svn"))
        .args(["--", "info"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(127));
}

#[test]
fn no_arguments_is_an_error() {
    let sb = Sandbox::new(ECHO_SVN);
    let output = sb.svw().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no svn arguments"));
}

#[test]
fn config_file_sets_tool_path() {
    let sb = Sandbox::new(ECHO_SVN);
    let config = write_config(sb.dir.path(), &format!("svn_path = {:?}\n", sb.svn));
    let out = stdout_of(
        sb.svw().env_remove("SVW_SVN_PATH").arg("--config").arg(&config).args(["--", "log"]),
    );
    assert_eq!(out, "args: log --non-interactive\n");
}

#[test]
fn unknown_config_key_is_rejected() {
    let sb = Sandbox::new(ECHO_SVN);
    let config = write_config(sb.dir.path(), "svn_pth = \"svn\"\n");
    let output = sb.svw().arg("--config").arg(&config).args(["--", "info"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load configuration"));
}
