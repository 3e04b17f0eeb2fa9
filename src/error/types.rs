//! Error types
//!
//! Defines domain-specific error types for the digest codec and the credential stores.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Digest codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    /// Bad derivation parameters. Always a caller bug.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Malformed digest record: {0}")]
    MalformedRecord(String),
}

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid username {0:?}: must not contain a colon or control characters")]
    InvalidUsername(String),
    #[error("Invalid digest text for user {username}: {reason}")]
    InvalidDigestText { username: String, reason: String },
    #[error("User {0} does not exist")]
    UserNotFound(String),
    #[error("User {0} exists. To update the password, set update=true")]
    UserExists(String),
    #[error("Could not parse {}: line {line}: {reason}", path.display())]
    MalformedStore {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Path {} does not exist", .0.display())]
    PathNotFound(PathBuf),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Database error on {}: {source}", path.display())]
    Database {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn database(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        StoreError::Database {
            path: path.into(),
            source,
        }
    }
}

/// General error that encompasses all error types returned by the
/// collaborator-facing operations
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Digest error: {0}")]
    Codec(#[from] CodecError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
