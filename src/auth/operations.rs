//! User management operations
//!
//! Hash derivation and the add/remove/list operations consumed by
//! configuration management.

use log::debug;

use super::credentials::Secret;
use crate::digest::{DigestRecord, Scheme};
use crate::error::CredentialError;
use crate::storage::{CredentialStore, UserListing};

/// Derives a fresh digest for `password` and serializes it.
pub fn derive_and_serialize(password: &[u8], scheme: &Scheme) -> Result<String, CredentialError> {
    Ok(DigestRecord::derive(password, scheme)?.to_string())
}

/// Alias of [`derive_and_serialize`] under the broker tooling's name.
pub fn get_hash(password: &[u8], scheme: &Scheme) -> Result<String, CredentialError> {
    derive_and_serialize(password, scheme)
}

/// Adds a user, or updates its digest when `update` is set.
///
/// The username is validated before the store is touched.
pub fn add_user<S>(
    username: &str,
    secret: Secret<'_>,
    update: bool,
    store: &S,
) -> Result<(), CredentialError>
where
    S: CredentialStore + ?Sized,
{
    let digest_text = secret.to_digest_text()?;
    store.add(username, &digest_text, update)?;
    debug!(
        "Stored credentials for {} in {} (update={})",
        username,
        store.path().display(),
        update
    );
    Ok(())
}

/// Removes a user, failing with `UserNotFound` if absent.
pub fn remove_user<S>(username: &str, store: &S) -> Result<(), CredentialError>
where
    S: CredentialStore + ?Sized,
{
    store.remove(username)?;
    Ok(())
}

pub fn list_users<S>(store: &S, include_digest: bool) -> Result<UserListing, CredentialError>
where
    S: CredentialStore + ?Sized,
{
    Ok(store.list(include_digest)?)
}
