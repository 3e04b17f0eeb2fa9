//! Credential storage
//!
//! A uniform CRUD contract over the flat password file and the SQLite
//! `users` table, with automatic backend selection.

pub mod backend;
pub mod file;
pub mod filesystem;
pub mod results;
pub mod selector;
pub mod table;
pub mod validation;

pub use backend::CredentialStore;
pub use file::FileStore;
pub use results::UserListing;
pub use selector::{
    BackendKind, SQLITE_SIGNATURE, Store, clear_signature_cache, detect_backend,
    invalidate_signature_cache,
};
pub use table::TableStore;
pub use validation::{MAX_USERNAME_LEN, validate_username};
