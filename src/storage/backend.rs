//! Credential store contract
//!
//! Both backends implement the primitive lookups and writes; the conflict
//! rules of `add` and `remove` live here so they are identical for both.

use std::path::Path;

use crate::error::StoreError;
use crate::storage::results::UserListing;
use crate::storage::validation::{validate_digest_text, validate_username};

pub trait CredentialStore {
    /// Backing file of this store
    fn path(&self) -> &Path;

    fn exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Stored digest record text, or `UserNotFound`.
    fn get_digest(&self, username: &str) -> Result<String, StoreError>;

    fn list(&self, include_digest: bool) -> Result<UserListing, StoreError>;

    /// Inserts or overwrites without any conflict check.
    fn put(&self, username: &str, digest_text: &str) -> Result<(), StoreError>;

    /// Deletes a user known to exist.
    fn delete(&self, username: &str) -> Result<(), StoreError>;

    /// Adds `username`, or overwrites its digest when `update` is set.
    /// Fails with `UserExists` if the user is present and `update` is not.
    fn add(&self, username: &str, digest_text: &str, update: bool) -> Result<(), StoreError> {
        validate_username(username)?;
        validate_digest_text(username, digest_text)?;
        if !update && self.exists(username)? {
            return Err(StoreError::UserExists(username.to_string()));
        }
        self.put(username, digest_text)
    }

    /// Removes `username`, failing with `UserNotFound` if absent.
    fn remove(&self, username: &str) -> Result<(), StoreError> {
        if !self.exists(username)? {
            return Err(StoreError::UserNotFound(username.to_string()));
        }
        self.delete(username)
    }
}
