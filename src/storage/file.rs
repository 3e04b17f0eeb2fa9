//! Flat-file credential store
//!
//! One `username:digest_record_text` line per user, LF terminated, sorted by
//! username. Every mutation loads the whole file, changes it in memory and
//! rewrites it atomically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::StoreError;
use crate::storage::backend::CredentialStore;
use crate::storage::filesystem::{ensure_exists, rewrite_atomically};
use crate::storage::results::UserListing;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        ensure_exists(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        ensure_exists(&self.path)?;
        let bytes = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            StoreError::MalformedStore {
                path: self.path.clone(),
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                reason: "not valid UTF-8".into(),
            }
        })?;
        parse_users(&self.path, &content)
    }

    fn save(&self, users: &BTreeMap<String, String>) -> Result<(), StoreError> {
        ensure_exists(&self.path)?;
        rewrite_atomically(&self.path, serialize_users(users).as_bytes())
    }
}

impl CredentialStore for FileStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.load()?.contains_key(username))
    }

    fn get_digest(&self, username: &str) -> Result<String, StoreError> {
        self.load()?
            .remove(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    fn list(&self, include_digest: bool) -> Result<UserListing, StoreError> {
        Ok(UserListing::from_map(self.load()?, include_digest))
    }

    fn put(&self, username: &str, digest_text: &str) -> Result<(), StoreError> {
        let mut users = self.load()?;
        let replaced = users
            .insert(username.to_string(), digest_text.to_string())
            .is_some();
        self.save(&users)?;
        debug!(
            "{} user {} in {}",
            if replaced { "Updated" } else { "Added" },
            username,
            self.path.display()
        );
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<(), StoreError> {
        let mut users = self.load()?;
        if users.remove(username).is_none() {
            return Err(StoreError::UserNotFound(username.to_string()));
        }
        self.save(&users)?;
        debug!("Removed user {} from {}", username, self.path.display());
        Ok(())
    }
}

/// Parses password file content. Blank lines are skipped; every other line
/// must hold exactly one `:` with a non-empty username before it.
pub fn parse_users(path: &Path, content: &str) -> Result<BTreeMap<String, String>, StoreError> {
    let mut users = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: &str| StoreError::MalformedStore {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: reason.to_string(),
        };

        let (username, digest) = line
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' separator"))?;
        if digest.contains(':') {
            return Err(malformed("more than one ':' separator"));
        }
        if username.is_empty() {
            return Err(malformed("empty username"));
        }
        users.insert(username.to_string(), digest.to_string());
    }
    Ok(users)
}

/// Canonical file content: sorted by username, one LF-terminated line each.
pub fn serialize_users(users: &BTreeMap<String, String>) -> String {
    users
        .iter()
        .map(|(user, digest)| format!("{user}:{digest}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(u, d)| (u.to_string(), d.to_string()))
            .collect()
    }

    #[test]
    fn parse_skips_blank_lines_and_tolerates_crlf() {
        let users = parse_users(Path::new("passwd"), "bob:$6$b$c\r\n\nalice:$7$1$a$b\n").unwrap();
        assert_eq!(users, map(&[("alice", "$7$1$a$b"), ("bob", "$6$b$c")]));
    }

    #[test]
    fn parse_reports_line_numbers() {
        let err = parse_users(Path::new("passwd"), "alice:h\n\nbroken line\n").unwrap_err();
        match err {
            StoreError::MalformedStore { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_users(Path::new("passwd"), "a:b:c\n").is_err());
        assert!(parse_users(Path::new("passwd"), ":hash\n").is_err());
    }

    #[test]
    fn serialize_is_sorted_with_trailing_newline() {
        let users = map(&[("zed", "h3"), ("Alice", "h1"), ("bob", "h2")]);
        assert_eq!(serialize_users(&users), "Alice:h1\nbob:h2\nzed:h3\n");
        assert_eq!(serialize_users(&BTreeMap::new()), "");
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, b"alice:h\nb\xffb:h\n").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert!(matches!(
            store.list(false),
            Err(StoreError::MalformedStore { line: 2, .. })
        ));
    }
}
