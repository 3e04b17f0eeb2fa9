//! Error handling
//!
//! Defines error types and their classification.

pub mod handlers;
pub mod types;

pub use handlers::ErrorKind;
pub use types::*;
