// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed key/value record shared with the tool's own auth files.
//!
//! ```text
//! K <len>
//! <key>
//! V <len>
//! <value>
//! ...
//! END
//! ```

use std::collections::HashMap;

pub(crate) const REALM_KEY: &str = "svn:realmstring";
pub(crate) const USERNAME_KEY: &str = "username";
pub(crate) const PASSWORD_KEY: &str = "password";
const END_MARKER: &[u8] = b"END";

/// Serialize the realm, username, and password entries in that order.
pub(crate) fn encode(realm: &str, username: &str, password: &str) -> String {
    let mut out = String::new();
    push_entry(&mut out, REALM_KEY, realm);
    push_entry(&mut out, USERNAME_KEY, username);
    push_entry(&mut out, PASSWORD_KEY, password);
    out.push_str("END\n");
    out
}

fn push_entry(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("K {}\n{}\nV {}\n{}\n", key.len(), key, value.len(), value));
}

/// Parse a record into its entries. `None` if the bytes are malformed or
/// the `END` marker is missing.
pub(crate) fn parse(bytes: &[u8]) -> Option<HashMap<String, String>> {
    let mut cursor = Cursor { bytes, pos: 0 };
    let mut entries = HashMap::new();

    loop {
        let header = cursor.line()?;
        if header == END_MARKER {
            return Some(entries);
        }
        let key = cursor.sized(header, b"K ")?;
        let value_header = cursor.line()?;
        let value = cursor.sized(value_header, b"V ")?;
        entries.insert(key, value);
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Next line without its `\n` (a final unterminated line is accepted).
    fn line(&mut self) -> Option<&'a [u8]> {
        let rest = self.bytes.get(self.pos..)?;
        if rest.is_empty() {
            return None;
        }
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        Some(&rest[..end])
    }

    /// Read a `<prefix><len>` header's payload of exactly `len` bytes plus `\n`.
    fn sized(&mut self, header: &[u8], prefix: &[u8]) -> Option<String> {
        let len: usize = std::str::from_utf8(header.strip_prefix(prefix)?).ok()?.parse().ok()?;
        let end = self.pos.checked_add(len)?;
        let payload = self.bytes.get(self.pos..end)?;
        if self.bytes.get(end) != Some(&b'\n') {
            return None;
        }
        self.pos = end + 1;
        String::from_utf8(payload.to_vec()).ok()
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
