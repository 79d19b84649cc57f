// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk credential cache in the tool's `svn.simple` layout.
//!
//! One file per realm, named by the MD5 of the realm string. Files written by
//! this process are tracked and removed again by [`CredentialCache::dispose`]
//! (also run on drop), so a session never leaves plaintext passwords behind.

mod permissions;
mod record;

use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use svw_core::{Credential, ErrorKind, RealmError, RealmKey, SvwConfig};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Realm(#[from] RealmError),
    #[error("no home directory for the credential cache")]
    NoCacheDir,
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("credential cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path, source }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::CredentialIoError
    }
}

pub struct CredentialCache {
    dir: PathBuf,
    written: Mutex<HashSet<PathBuf>>,
}

impl CredentialCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), written: Mutex::new(HashSet::new()) }
    }

    /// Use `cache_dir` from config, else the platform default.
    pub fn from_config(config: &SvwConfig) -> Result<Self, CacheError> {
        let dir = match &config.cache_dir {
            Some(dir) => dir.clone(),
            None => default_dir().ok_or(CacheError::NoCacheDir)?,
        };
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, realm_url: &str) -> Result<PathBuf, CacheError> {
        let realm = RealmKey::from_url(realm_url)?;
        Ok(self.dir.join(realm.file_name()))
    }

    /// Files this instance wrote and has not yet removed.
    pub fn written(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.written.lock().iter().cloned().collect();
        paths.sort();
        paths
    }

    /// Store a credential for the realm of `realm_url`, replacing any existing
    /// record atomically. Returns the file path.
    pub async fn write(
        &self,
        username: &str,
        password: &str,
        realm_url: &str,
    ) -> Result<PathBuf, CacheError> {
        let realm = RealmKey::from_url(realm_url)?;
        let path = self.dir.join(realm.file_name());

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| CacheError::io(&self.dir, e))?;
        permissions::restrict_dir(&self.dir).await.map_err(|e| CacheError::io(&self.dir, e))?;

        let tmp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            realm.file_name(),
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let body = record::encode(realm.as_str(), username, password);

        if let Err(e) = write_private(&tmp, body.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::io(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::io(&path, e));
        }

        self.written.lock().insert(path.clone());
        tracing::debug!(realm = %realm, path = %path.display(), "cached credential");
        Ok(path)
    }

    /// Load the credential stored for the realm of `realm_url`.
    ///
    /// A missing, malformed, or incomplete file yields `None`. Only a
    /// permission failure is an error.
    pub async fn read(&self, realm_url: &str) -> Result<Option<Credential>, CacheError> {
        let realm = RealmKey::from_url(realm_url)?;
        let path = self.dir.join(realm.file_name());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(CacheError::io(&path, e))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable credential file");
                return Ok(None);
            }
        };

        let Some(mut entries) = record::parse(&bytes) else {
            tracing::debug!(path = %path.display(), "ignoring malformed credential file");
            return Ok(None);
        };
        if entries.get(record::REALM_KEY).is_some_and(|stored| stored != realm.as_str()) {
            tracing::debug!(path = %path.display(), "credential file belongs to another realm");
            return Ok(None);
        }

        match (entries.remove(record::USERNAME_KEY), entries.remove(record::PASSWORD_KEY)) {
            (Some(username), Some(password)) => Ok(Some(Credential::new(username, password))),
            _ => Ok(None),
        }
    }

    /// Remove the realm's file. Absent files are not an error.
    pub async fn delete(&self, realm_url: &str) -> Result<(), CacheError> {
        let path = self.path_for(realm_url)?;
        self.written.lock().remove(&path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Best-effort removal of every file this instance wrote.
    pub fn dispose(&self) {
        let paths: Vec<PathBuf> = self.written.lock().drain().collect();
        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed cached credential"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove cached credential")
                }
            }
        }
    }
}

impl Drop for CredentialCache {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// `~/.subversion/auth/svn.simple`, or the roaming config dir on Windows.
pub fn default_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        dirs::config_dir().map(|d| d.join("Subversion").join("auth").join("svn.simple"))
    } else {
        dirs::home_dir().map(|d| d.join(".subversion").join("auth").join("svn.simple"))
    }
}

async fn write_private(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(permissions::FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    drop(file);
    permissions::restrict_file(path).await
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
