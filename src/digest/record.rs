//! Scheme-agnostic digest records

use std::fmt;

use crate::digest::current::{CURRENT_ALGORITHM_TAG, CurrentDigest};
use crate::digest::legacy::LegacyDigest;
use crate::digest::scheme::Scheme;
use crate::error::CodecError;

/// A parsed, verifiable password hash in either broker format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestRecord {
    Legacy(LegacyDigest),
    Current(CurrentDigest),
}

impl DigestRecord {
    /// Derives a fresh digest (new random salt) for `password`.
    pub fn derive(password: &[u8], scheme: &Scheme) -> Result<Self, CodecError> {
        match scheme {
            Scheme::Legacy(params) => LegacyDigest::derive(password, params).map(Self::Legacy),
            Scheme::Current(params) => CurrentDigest::derive(password, params).map(Self::Current),
        }
    }

    /// Parses either format. Text starting with the `PBKDF2$` tag (after an
    /// optional `username:` prefix) is the current format, anything else is
    /// tried as legacy.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let body = strip_username(text);
        if body
            .split('$')
            .next()
            .is_some_and(|tag| tag == CURRENT_ALGORITHM_TAG)
        {
            CurrentDigest::parse(body).map(Self::Current)
        } else {
            LegacyDigest::parse(body).map(Self::Legacy)
        }
    }

    pub fn verify(&self, password: &[u8]) -> bool {
        match self {
            DigestRecord::Legacy(d) => d.verify(password),
            DigestRecord::Current(d) => d.verify(password),
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            DigestRecord::Legacy(d) => d.iterations(),
            DigestRecord::Current(d) => d.iterations(),
        }
    }

    pub fn salt(&self) -> &[u8] {
        match self {
            DigestRecord::Legacy(d) => d.salt(),
            DigestRecord::Current(d) => d.salt(),
        }
    }

    pub fn digest(&self) -> &[u8] {
        match self {
            DigestRecord::Legacy(d) => d.digest(),
            DigestRecord::Current(d) => d.digest(),
        }
    }
}

impl fmt::Display for DigestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestRecord::Legacy(d) => fmt::Display::fmt(d, f),
            DigestRecord::Current(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl From<LegacyDigest> for DigestRecord {
    fn from(digest: LegacyDigest) -> Self {
        DigestRecord::Legacy(digest)
    }
}

impl From<CurrentDigest> for DigestRecord {
    fn from(digest: CurrentDigest) -> Self {
        DigestRecord::Current(digest)
    }
}

/// Drops everything up to and including the last `:`, i.e. a leading
/// `username:` as found in a password file line.
pub(crate) fn strip_username(text: &str) -> &str {
    match text.rfind(':') {
        Some(idx) => &text[idx + 1..],
        None => text,
    }
}
