//! Authentication backend operations
//!
//! The surface used by configuration management: existence checks,
//! password checks, hash derivation and user add/remove/list.

pub mod credentials;
pub mod operations;
pub mod validator;

pub use credentials::{CheckTarget, Secret};
pub use operations::{add_user, derive_and_serialize, get_hash, list_users, remove_user};
pub use validator::{check_password, check_password_hash, user_exists};
