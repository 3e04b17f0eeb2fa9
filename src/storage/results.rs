//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::collections::BTreeMap;

/// Result of a listing, shaped by the `include_digest` flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserListing {
    /// Usernames in lexicographic order
    Names(Vec<String>),
    /// Username to digest record text
    WithDigests(BTreeMap<String, String>),
}

impl UserListing {
    pub fn len(&self) -> usize {
        match self {
            UserListing::Names(names) => names.len(),
            UserListing::WithDigests(users) => users.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, username: &str) -> bool {
        match self {
            UserListing::Names(names) => names.iter().any(|n| n == username),
            UserListing::WithDigests(users) => users.contains_key(username),
        }
    }

    /// Usernames in lexicographic order, whichever shape this is
    pub fn usernames(&self) -> Vec<&str> {
        match self {
            UserListing::Names(names) => names.iter().map(String::as_str).collect(),
            UserListing::WithDigests(users) => users.keys().map(String::as_str).collect(),
        }
    }

    pub(crate) fn from_map(users: BTreeMap<String, String>, include_digest: bool) -> Self {
        if include_digest {
            UserListing::WithDigests(users)
        } else {
            UserListing::Names(users.into_keys().collect())
        }
    }
}
