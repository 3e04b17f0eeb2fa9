//! Password and user validation
//!
//! Existence and password checks against a credential store.

use super::credentials::CheckTarget;
use crate::digest::DigestRecord;
use crate::error::CredentialError;
use crate::storage::CredentialStore;

/// Whether `username` has a record in `store`.
pub fn user_exists<S>(username: &str, store: &S) -> Result<bool, CredentialError>
where
    S: CredentialStore + ?Sized,
{
    Ok(store.exists(username)?)
}

/// Checks `password` against a user's stored digest or a given digest text.
///
/// A username that is not in the store is `UserNotFound`, not `false`;
/// unparseable digest text is `MalformedRecord`.
pub fn check_password<S>(
    password: &[u8],
    target: CheckTarget<'_>,
    store: &S,
) -> Result<bool, CredentialError>
where
    S: CredentialStore + ?Sized,
{
    let record = match target {
        CheckTarget::Username(username) => DigestRecord::parse(&store.get_digest(username)?)?,
        CheckTarget::DigestText(text) => DigestRecord::parse(text)?,
    };
    Ok(record.verify(password))
}

/// Checks `password` against digest text without any store.
pub fn check_password_hash(password: &[u8], digest_text: &str) -> Result<bool, CredentialError> {
    Ok(DigestRecord::parse(digest_text)?.verify(password))
}
