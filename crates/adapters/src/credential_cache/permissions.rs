// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner-only access for cache files and their directory.

use std::ffi::OsString;
use std::io;
use std::path::Path;

#[cfg(unix)]
pub(super) const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
pub(super) const FILE_MODE: u32 = 0o600;

#[cfg(unix)]
pub(super) async fn restrict_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(DIR_MODE)).await
}

#[cfg(not(unix))]
pub(super) async fn restrict_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// The file is already created 0600 on unix; this re-asserts it in case the
/// umask or a pre-existing inode interfered.
#[cfg(unix)]
pub(super) async fn restrict_file(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(FILE_MODE)).await
}

/// ACL failures are logged and otherwise ignored.
#[cfg(windows)]
pub(super) async fn restrict_file(path: &Path) -> io::Result<()> {
    let Some(account) = current_account() else {
        tracing::warn!(path = %path.display(), "cannot resolve current user, leaving inherited ACL");
        return Ok(());
    };

    let result = tokio::process::Command::new("icacls")
        .args(icacls_args(path, &account))
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {}
        Ok(output) => tracing::warn!(
            path = %path.display(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "icacls failed to restrict credential file",
        ),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to run icacls"),
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub(super) async fn restrict_file(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// `DOMAIN\user`, or bare `user` when no domain is set.
#[cfg(windows)]
fn current_account() -> Option<String> {
    let user = std::env::var("USERNAME").ok().filter(|u| !u.is_empty())?;
    match std::env::var("USERDOMAIN").ok().filter(|d| !d.is_empty()) {
        Some(domain) => Some(format!("{domain}\\{user}")),
        None => Some(user),
    }
}

/// Arguments that strip inherited ACEs and grant `account` full control.
///
/// Passed as discrete argv entries; nothing is interpreted by a shell.
#[cfg_attr(not(windows), allow(dead_code))]
pub(super) fn icacls_args(path: &Path, account: &str) -> Vec<OsString> {
    vec![
        path.as_os_str().to_os_string(),
        OsString::from("/inheritance:r"),
        OsString::from("/grant:r"),
        OsString::from(format!("{account}:F")),
    ]
}
