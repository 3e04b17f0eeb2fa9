//! Credential inputs
//!
//! How callers name the password material an operation works on.

use crate::digest::{DigestRecord, Scheme};
use crate::error::CodecError;

/// What a password is checked against
#[derive(Debug, Clone, Copy)]
pub enum CheckTarget<'a> {
    /// Look the digest up in the store
    Username(&'a str),
    /// Digest record text supplied directly, optionally `username:` prefixed
    DigestText(&'a str),
}

/// The password material for a new or updated user
#[derive(Debug, Clone, Copy)]
pub enum Secret<'a> {
    /// Plaintext, hashed with the given scheme before storing
    Password(&'a [u8], Scheme),
    /// Ready-made digest record text, stored as is
    Hash(&'a str),
}

impl Secret<'_> {
    /// Digest record text to hand to a store
    pub fn to_digest_text(&self) -> Result<String, CodecError> {
        match self {
            Secret::Password(password, scheme) => {
                Ok(DigestRecord::derive(password, scheme)?.to_string())
            }
            Secret::Hash(text) => Ok((*text).to_string()),
        }
    }
}
