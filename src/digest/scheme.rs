//! Hashing schemes and derivation parameters

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::CodecError;

/// Salt length of the legacy broker format
pub const LEGACY_SALT_LEN: usize = 12;
/// Digest length of the legacy broker format (SHA-512 output)
pub const LEGACY_DIGEST_LEN: usize = 64;
/// Longest password the legacy broker tooling accepts
pub const LEGACY_MAX_PASSWORD_LEN: usize = 65500;
/// Broker default for legacy PBKDF2
pub const LEGACY_DEFAULT_ITERATIONS: u32 = 101;

pub const CURRENT_DEFAULT_ITERATIONS: u32 = 100_000;
pub const CURRENT_DEFAULT_KEY_LEN: usize = 32;
pub const CURRENT_DEFAULT_SALT_LEN: usize = 16;

/// Algorithms of the legacy format. The numeric tags are fixed by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyAlgorithm {
    Sha512,
    #[serde(rename = "pbkdf2")]
    Pbkdf2Sha512,
}

impl LegacyAlgorithm {
    pub fn tag(self) -> u8 {
        match self {
            LegacyAlgorithm::Sha512 => 6,
            LegacyAlgorithm::Pbkdf2Sha512 => 7,
        }
    }
}

impl FromStr for LegacyAlgorithm {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha512" => Ok(LegacyAlgorithm::Sha512),
            "pbkdf2" => Ok(LegacyAlgorithm::Pbkdf2Sha512),
            other => Err(CodecError::InvalidParameter(format!(
                "supported hashing algorithms are sha512 and pbkdf2, got {other:?}"
            ))),
        }
    }
}

/// HMAC hash function used by the current PBKDF2 format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HmacHash {
    Sha256,
    Sha512,
}

impl HmacHash {
    pub fn as_str(self) -> &'static str {
        match self {
            HmacHash::Sha256 => "sha256",
            HmacHash::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HmacHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HmacHash {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(HmacHash::Sha256),
            "sha512" => Ok(HmacHash::Sha512),
            other => Err(CodecError::InvalidParameter(format!(
                "hmac hashing function needs to be either sha256 or sha512, got {other:?}"
            ))),
        }
    }
}

/// Parameters for the legacy (`$6$` / `$7$`) format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LegacyParams {
    pub algorithm: LegacyAlgorithm,
    /// Ignored for SHA512, which is single pass.
    pub iterations: u32,
}

impl Default for LegacyParams {
    fn default() -> Self {
        Self {
            algorithm: LegacyAlgorithm::Pbkdf2Sha512,
            iterations: LEGACY_DEFAULT_ITERATIONS,
        }
    }
}

impl LegacyParams {
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.iterations < 1 {
            return Err(CodecError::InvalidParameter(
                "need at least one iteration".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters for the current (`PBKDF2$...`) format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CurrentParams {
    pub hmac: HmacHash,
    pub iterations: u32,
    pub key_length: usize,
    pub salt_size: usize,
}

impl Default for CurrentParams {
    fn default() -> Self {
        Self {
            hmac: HmacHash::Sha512,
            iterations: CURRENT_DEFAULT_ITERATIONS,
            key_length: CURRENT_DEFAULT_KEY_LEN,
            salt_size: CURRENT_DEFAULT_SALT_LEN,
        }
    }
}

impl CurrentParams {
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.iterations < 1 {
            return Err(CodecError::InvalidParameter(
                "need at least one iteration".into(),
            ));
        }
        if self.key_length < 1 {
            return Err(CodecError::InvalidParameter(
                "key length must be at least one byte".into(),
            ));
        }
        if self.salt_size < 1 {
            return Err(CodecError::InvalidParameter(
                "salt size must be at least one byte".into(),
            ));
        }
        Ok(())
    }
}

/// Which on-disk encoding to derive into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Legacy(LegacyParams),
    Current(CurrentParams),
}

impl Default for Scheme {
    fn default() -> Self {
        Scheme::Legacy(LegacyParams::default())
    }
}
