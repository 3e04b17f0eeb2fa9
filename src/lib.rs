//! Credential codec and pluggable credential store for an MQTT broker's
//! username/password authentication.
//!
//! [`digest`] derives and verifies password hashes in the broker's legacy
//! (`$6$`/`$7$`) and current (`PBKDF2$`) formats. [`storage`] manages
//! username to digest records in either a flat password file or a SQLite
//! `users` table, chosen by [`Store::open`]. [`auth`] is the surface
//! configuration management consumes.

pub mod auth;
pub mod config;
pub mod digest;
pub mod error;
pub mod storage;
pub mod utils;

pub use auth::{
    CheckTarget, Secret, add_user, check_password, derive_and_serialize, get_hash, list_users,
    remove_user, user_exists,
};
pub use config::CredstoreConfig;
pub use digest::{DigestRecord, Scheme};
pub use error::{CodecError, CredentialError, ErrorKind, StoreError};
pub use storage::{BackendKind, CredentialStore, Store, UserListing};
