// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication realm derived from a repository URL.
//!
//! The realm string has the shape `<scheme://host[:port]> Authentication Realm`.
//! The port appears only when the URL spells one out; an implicit default
//! port is never synthesized.

use md5::{Digest, Md5};
use std::fmt;
use thiserror::Error;

const REALM_SUFFIX: &str = "Authentication Realm";

/// Errors from realm derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RealmError {
    #[error("repository URL has no scheme: {0}")]
    MissingScheme(String),
    #[error("repository URL has no host: {0}")]
    MissingHost(String),
    #[error("repository URL has an invalid port: {0}")]
    InvalidPort(String),
}

/// Lookup key for the credential cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RealmKey {
    realm: String,
}

impl RealmKey {
    /// Derive the realm from a repository URL such as `https://host:8443/repo/trunk`.
    pub fn from_url(url: &str) -> Result<Self, RealmError> {
        let (scheme, rest) =
            url.split_once("://").ok_or_else(|| RealmError::MissingScheme(url.to_string()))?;
        if scheme.is_empty() {
            return Err(RealmError::MissingScheme(url.to_string()));
        }

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        // Drop any `user[:password]@` prefix
        let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

        let (host, port) = split_host_port(host_port, url)?;
        if host.is_empty() {
            return Err(RealmError::MissingHost(url.to_string()));
        }

        let scheme = scheme.to_ascii_lowercase();
        let host = host.to_ascii_lowercase();
        let realm = match port {
            Some(port) => format!("<{scheme}://{host}:{port}> {REALM_SUFFIX}"),
            None => format!("<{scheme}://{host}> {REALM_SUFFIX}"),
        };
        Ok(Self { realm })
    }

    pub fn as_str(&self) -> &str {
        &self.realm
    }

    /// Cache file name: lowercase hex MD5 of the realm string, the same
    /// naming the tool uses under `auth/svn.simple/`.
    pub fn file_name(&self) -> String {
        Md5::digest(self.realm.as_bytes()).iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for RealmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.realm)
    }
}

fn split_host_port<'a>(
    host_port: &'a str,
    url: &str,
) -> Result<(&'a str, Option<u16>), RealmError> {
    // Bracketed IPv6 literal: [::1]:8080
    if host_port.starts_with('[') {
        let close = host_port.find(']').ok_or_else(|| RealmError::MissingHost(url.to_string()))?;
        let host = &host_port[..=close];
        let port = match host_port[close + 1..].strip_prefix(':') {
            Some(p) => parse_port(p, url)?,
            None => None,
        };
        return Ok((host, port));
    }

    match host_port.rsplit_once(':') {
        Some((host, p)) => Ok((host, parse_port(p, url)?)),
        None => Ok((host_port, None)),
    }
}

fn parse_port(port: &str, url: &str) -> Result<Option<u16>, RealmError> {
    if port.is_empty() {
        return Ok(None);
    }
    port.parse::<u16>().map(Some).map_err(|_| RealmError::InvalidPort(url.to_string()))
}

#[cfg(test)]
#[path = "realm_tests.rs"]
mod tests;
