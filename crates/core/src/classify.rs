// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stderr classification.

use crate::error::ErrorCode;

/// Printed by the tool when it gave up cycling through credential providers.
const CREDENTIALS_EXHAUSTED: &str = "No more credentials or we tried too many times";

/// "Too many authentication failures" error code.
const TOO_MANY_FAILURES: &str = "E215004";

/// Map raw stderr text to an error code.
///
/// Exhausted-credential signatures win over any network code in the same
/// text so those failures re-enter the auth retry path.
pub fn classify(stderr: &str) -> Option<ErrorCode> {
    if stderr.contains(CREDENTIALS_EXHAUSTED) || stderr.contains(TOO_MANY_FAILURES) {
        return Some(ErrorCode::AuthorizationFailed);
    }

    ErrorCode::ALL
        .into_iter()
        .find(|code| stderr.contains(&format!("svn: {}", code.as_str())))
}

/// Strip the leading `svn: E123456: ` token from every line.
pub fn sanitize_stderr(stderr: &str) -> String {
    stderr.split_inclusive('\n').map(strip_code_prefix).collect()
}

fn strip_code_prefix(line: &str) -> &str {
    let Some(rest) = line.strip_prefix("svn: E") else {
        return line;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    match rest[digits..].strip_prefix(':') {
        Some(message) => message.trim_start_matches(' '),
        None => line,
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
