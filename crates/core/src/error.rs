// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by every layer.

use std::fmt;

/// Tool error codes recognized in `svn: <CODE>: <message>` stderr lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AuthorizationFailed,
    RepositoryLocked,
    NotARepository,
    AncestryMismatch,
    WorkingCopyTooOld,
    UnableToConnect,
    NetworkTimeout,
}

impl ErrorCode {
    /// Scan order used by the classifier.
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::AuthorizationFailed,
        ErrorCode::RepositoryLocked,
        ErrorCode::NotARepository,
        ErrorCode::AncestryMismatch,
        ErrorCode::WorkingCopyTooOld,
        ErrorCode::UnableToConnect,
        ErrorCode::NetworkTimeout,
    ];

    /// The tool's numeric error identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AuthorizationFailed => "E170001",
            ErrorCode::RepositoryLocked => "E155004",
            ErrorCode::NotARepository => "E155007",
            ErrorCode::AncestryMismatch => "E195012",
            ErrorCode::WorkingCopyTooOld => "E155036",
            ErrorCode::UnableToConnect => "E170013",
            ErrorCode::NetworkTimeout => "E175012",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of failure kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ToolNotFound,
    Timeout,
    Cancelled,
    AuthorizationFailed,
    RepositoryLocked,
    NotARepository,
    AncestryMismatch,
    WorkingCopyTooOld,
    UnableToConnect,
    NetworkTimeout,
    /// Nonzero exit whose stderr matched nothing in the table.
    Unclassified,
    /// Credential cache read/write failure (distinct from "no credential").
    CredentialIoError,
}

impl From<ErrorCode> for ErrorKind {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::AuthorizationFailed => ErrorKind::AuthorizationFailed,
            ErrorCode::RepositoryLocked => ErrorKind::RepositoryLocked,
            ErrorCode::NotARepository => ErrorKind::NotARepository,
            ErrorCode::AncestryMismatch => ErrorKind::AncestryMismatch,
            ErrorCode::WorkingCopyTooOld => ErrorKind::WorkingCopyTooOld,
            ErrorCode::UnableToConnect => ErrorKind::UnableToConnect,
            ErrorCode::NetworkTimeout => ErrorKind::NetworkTimeout,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ToolNotFound => "tool not found",
            ErrorKind::Timeout => "timed out",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::AuthorizationFailed => "authorization failed",
            ErrorKind::RepositoryLocked => "repository locked",
            ErrorKind::NotARepository => "not a working copy",
            ErrorKind::AncestryMismatch => "no common ancestry",
            ErrorKind::WorkingCopyTooOld => "working copy too old",
            ErrorKind::UnableToConnect => "unable to connect",
            ErrorKind::NetworkTimeout => "network timeout",
            ErrorKind::Unclassified => "command failed",
            ErrorKind::CredentialIoError => "credential cache I/O error",
        };
        f.write_str(s)
    }
}
