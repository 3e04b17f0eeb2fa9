//! SQLite credential store
//!
//! Works against a pre-existing `users(username, password_hash, is_admin)`
//! table. Each operation is a single parameterized statement on one
//! autocommit connection held for the lifetime of the store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::error::StoreError;
use crate::storage::backend::CredentialStore;
use crate::storage::filesystem::ensure_exists;
use crate::storage::results::UserListing;

const COUNT_USER: &str = "SELECT COUNT(*) FROM users WHERE username = ?1";
const SELECT_HASH: &str = "SELECT password_hash FROM users WHERE username = ?1";
const LIST_NAMES: &str = "SELECT username FROM users ORDER BY username";
const LIST_WITH_HASHES: &str = "SELECT username, password_hash FROM users ORDER BY username";
const UPDATE_HASH: &str = "UPDATE users SET password_hash = ?1 WHERE username = ?2";
// is_admin is required by the schema but has no meaning here
const INSERT_USER: &str =
    "INSERT INTO users (username, password_hash, is_admin) VALUES (?1, ?2, false)";
const DELETE_USER: &str = "DELETE FROM users WHERE username = ?1";

pub struct TableStore {
    path: PathBuf,
    conn: Connection,
}

impl TableStore {
    /// Opens an existing database read-write. The file is never created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        ensure_exists(path)?;
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| StoreError::database(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    fn db_err(&self, source: rusqlite::Error) -> StoreError {
        StoreError::database(&self.path, source)
    }
}

impl CredentialStore for TableStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self, username: &str) -> Result<bool, StoreError> {
        let count: i64 = self
            .conn
            .query_row(COUNT_USER, params![username], |row| row.get(0))
            .map_err(|e| self.db_err(e))?;
        Ok(count != 0)
    }

    fn get_digest(&self, username: &str) -> Result<String, StoreError> {
        self.conn
            .query_row(SELECT_HASH, params![username], |row| row.get::<_, String>(0))
            .optional()
            .map_err(|e| self.db_err(e))?
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    fn list(&self, include_digest: bool) -> Result<UserListing, StoreError> {
        if include_digest {
            let mut stmt = self
                .conn
                .prepare(LIST_WITH_HASHES)
                .map_err(|e| self.db_err(e))?;
            let users = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
                .map_err(|e| self.db_err(e))?
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map_err(|e| self.db_err(e))?;
            Ok(UserListing::WithDigests(users))
        } else {
            let mut stmt = self.conn.prepare(LIST_NAMES).map_err(|e| self.db_err(e))?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| self.db_err(e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| self.db_err(e))?;
            Ok(UserListing::Names(names))
        }
    }

    fn put(&self, username: &str, digest_text: &str) -> Result<(), StoreError> {
        if self.exists(username)? {
            self.conn
                .execute(UPDATE_HASH, params![digest_text, username])
                .map_err(|e| self.db_err(e))?;
            debug!("Updated user {} in {}", username, self.path.display());
        } else {
            self.conn
                .execute(INSERT_USER, params![username, digest_text])
                .map_err(|e| self.db_err(e))?;
            debug!("Added user {} to {}", username, self.path.display());
        }
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<(), StoreError> {
        self.conn
            .execute(DELETE_USER, params![username])
            .map_err(|e| self.db_err(e))?;
        debug!("Removed user {} from {}", username, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (username TEXT UNIQUE, password_hash TEXT, is_admin BOOLEAN);",
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn insert_writes_is_admin_false() {
        let (_dir, path) = fixture();
        let store = TableStore::open(&path).unwrap();
        store.add("alice", "PBKDF2$sha512$1$c2FsdA==$ZGln", false).unwrap();

        let conn = Connection::open(&path).unwrap();
        let is_admin: bool = conn
            .query_row(
                "SELECT is_admin FROM users WHERE username = ?1",
                params!["alice"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(!is_admin);
    }

    #[test]
    fn usernames_are_bound_not_interpolated() {
        let (_dir, path) = fixture();
        let store = TableStore::open(&path).unwrap();
        store.add("bob", "h1", false).unwrap();

        let hostile = "x' OR '1'='1";
        assert!(!store.exists(hostile).unwrap());
        assert!(matches!(
            store.get_digest(hostile),
            Err(StoreError::UserNotFound(_))
        ));
        store.add("robert'); DROP TABLE users;--", "h2", false).unwrap();
        assert_eq!(store.list(false).unwrap().len(), 2);
    }

    #[test]
    fn missing_table_is_a_database_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();

        let store = TableStore::open(&path).unwrap();
        assert!(matches!(
            store.exists("alice"),
            Err(StoreError::Database { .. })
        ));
    }

    #[test]
    fn open_does_not_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        assert!(matches!(
            TableStore::open(&path),
            Err(StoreError::PathNotFound(_))
        ));
        assert!(!path.exists());
    }
}
