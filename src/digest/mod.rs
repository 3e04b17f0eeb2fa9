//! Password digest codec
//!
//! Derives, serializes, parses and verifies password hashes in the broker's
//! legacy (`$6$`/`$7$`) and current (`PBKDF2$`) encodings. No I/O.

pub mod current;
pub mod encoding;
pub mod legacy;
pub mod record;
pub mod scheme;

pub use current::CurrentDigest;
pub use legacy::LegacyDigest;
pub use record::DigestRecord;
pub use scheme::{CurrentParams, HmacHash, LegacyAlgorithm, LegacyParams, Scheme};
