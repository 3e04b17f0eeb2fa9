//! Backend selection
//!
//! Picks the SQLite backend when the file starts with the SQLite header and
//! the flat-file backend otherwise. The detected kind is cached per
//! resolved path for the life of the process; callers that change a file's
//! format out of band must invalidate it.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::error::StoreError;
use crate::storage::backend::CredentialStore;
use crate::storage::file::FileStore;
use crate::storage::results::UserListing;
use crate::storage::table::TableStore;

/// First 16 bytes of every SQLite 3 database file
pub const SQLITE_SIGNATURE: &[u8; 16] = b"SQLite format 3\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Table,
}

static SIGNATURE_CACHE: LazyLock<Mutex<HashMap<String, BackendKind>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn signature_cache() -> MutexGuard<'static, HashMap<String, BackendKind>> {
    SIGNATURE_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn resolve(path: &Path) -> Result<PathBuf, StoreError> {
    fs::canonicalize(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::PathNotFound(path.to_path_buf()),
        _ => StoreError::io(path, e),
    })
}

fn read_signature(path: &Path) -> Result<BackendKind, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut header = Vec::with_capacity(SQLITE_SIGNATURE.len());
    file.take(SQLITE_SIGNATURE.len() as u64)
        .read_to_end(&mut header)
        .map_err(|e| StoreError::io(path, e))?;

    if header.as_slice() == SQLITE_SIGNATURE {
        Ok(BackendKind::Table)
    } else {
        Ok(BackendKind::File)
    }
}

/// Detects which backend `path` needs, consulting the cache first.
pub fn detect_backend(path: &Path) -> Result<BackendKind, StoreError> {
    let resolved = resolve(path)?;
    let key = resolved.to_string_lossy().into_owned();

    if let Some(kind) = signature_cache().get(&key).copied() {
        trace!("Cached backend for {}: {:?}", key, kind);
        return Ok(kind);
    }

    let kind = read_signature(&resolved)?;
    debug!("Detected {:?} backend for {}", kind, key);
    signature_cache().insert(key, kind);
    Ok(kind)
}

/// Forgets the cached backend kind of `path`.
pub fn invalidate_signature_cache(path: &Path) {
    let key = match fs::canonicalize(path) {
        Ok(resolved) => resolved.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    };
    signature_cache().remove(&key);
}

pub fn clear_signature_cache() {
    signature_cache().clear();
}

/// A credential store of either backend behind one contract
pub enum Store {
    File(FileStore),
    Table(TableStore),
}

impl Store {
    /// Opens `path` with the backend its signature calls for.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        match detect_backend(path)? {
            BackendKind::Table => TableStore::open(path).map(Store::Table),
            BackendKind::File => FileStore::open(path).map(Store::File),
        }
    }

    /// Like [`Store::open`] but re-reads the signature instead of trusting
    /// the cache.
    pub fn reopen(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        invalidate_signature_cache(path);
        Self::open(path)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Store::File(_) => BackendKind::File,
            Store::Table(_) => BackendKind::Table,
        }
    }

    fn backend(&self) -> &dyn CredentialStore {
        match self {
            Store::File(store) => store,
            Store::Table(store) => store,
        }
    }
}

impl CredentialStore for Store {
    fn path(&self) -> &Path {
        self.backend().path()
    }

    fn exists(&self, username: &str) -> Result<bool, StoreError> {
        self.backend().exists(username)
    }

    fn get_digest(&self, username: &str) -> Result<String, StoreError> {
        self.backend().get_digest(username)
    }

    fn list(&self, include_digest: bool) -> Result<UserListing, StoreError> {
        self.backend().list(include_digest)
    }

    fn put(&self, username: &str, digest_text: &str) -> Result<(), StoreError> {
        self.backend().put(username, digest_text)
    }

    fn delete(&self, username: &str) -> Result<(), StoreError> {
        self.backend().delete(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_empty_files_are_flat_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        let short = dir.path().join("short");
        fs::write(&empty, "").unwrap();
        fs::write(&short, "SQLite").unwrap();

        assert_eq!(detect_backend(&empty).unwrap(), BackendKind::File);
        assert_eq!(detect_backend(&short).unwrap(), BackendKind::File);
    }

    #[test]
    fn signature_alone_selects_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.db");
        fs::write(&path, SQLITE_SIGNATURE).unwrap();
        assert_eq!(detect_backend(&path).unwrap(), BackendKind::Table);
    }

    #[test]
    fn cache_holds_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, "alice:h\n").unwrap();
        assert_eq!(detect_backend(&path).unwrap(), BackendKind::File);

        fs::write(&path, SQLITE_SIGNATURE).unwrap();
        assert_eq!(detect_backend(&path).unwrap(), BackendKind::File);

        invalidate_signature_cache(&path);
        assert_eq!(detect_backend(&path).unwrap(), BackendKind::Table);
    }

    #[test]
    fn missing_path_is_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        assert!(matches!(
            detect_backend(&path),
            Err(StoreError::PathNotFound(p)) if p == path
        ));
        assert!(matches!(Store::open(&path), Err(StoreError::PathNotFound(_))));
    }
}
