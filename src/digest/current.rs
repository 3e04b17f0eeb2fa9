//! Current pluggable-backend password format
//!
//! `PBKDF2$<sha256|sha512>$<iterations>$<salt>$<digest>`. The key length is
//! never written out; it is recovered from the decoded digest length.

use std::fmt;

use crate::digest::encoding::{constant_time_eq, decode_b64, encode_b64, pbkdf2, random_salt};
use crate::digest::legacy::parse_iterations;
use crate::digest::record::strip_username;
use crate::digest::scheme::{CurrentParams, HmacHash};
use crate::error::CodecError;

/// Algorithm tag of the current format. Only PBKDF2 is defined.
pub const CURRENT_ALGORITHM_TAG: &str = "PBKDF2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentDigest {
    hmac: HmacHash,
    iterations: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl CurrentDigest {
    /// Derives a digest with a fresh random salt of `params.salt_size` bytes.
    pub fn derive(password: &[u8], params: &CurrentParams) -> Result<Self, CodecError> {
        params.validate()?;
        Self::derive_with_salt(password, params, &random_salt(params.salt_size))
    }

    /// Derives a digest with a caller-supplied salt; `params.salt_size` is
    /// ignored.
    pub fn derive_with_salt(
        password: &[u8],
        params: &CurrentParams,
        salt: &[u8],
    ) -> Result<Self, CodecError> {
        params.validate()?;
        if salt.is_empty() {
            return Err(CodecError::InvalidParameter("salt must not be empty".into()));
        }

        let mut digest = vec![0u8; params.key_length];
        pbkdf2(params.hmac, password, salt, params.iterations, &mut digest)?;

        Ok(Self {
            hmac: params.hmac,
            iterations: params.iterations,
            salt: salt.to_vec(),
            digest,
        })
    }

    /// Parses `[username:]PBKDF2$hmac$iterations$salt$digest`.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let parts: Vec<&str> = strip_username(text).split('$').collect();
        let [algo, hmac, iterations, salt, digest] = parts.as_slice() else {
            return Err(CodecError::MalformedRecord(format!(
                "expected 5 '$'-separated fields, got {}",
                parts.len()
            )));
        };

        if *algo != CURRENT_ALGORITHM_TAG {
            return Err(CodecError::MalformedRecord(format!(
                "unsupported algorithm {algo:?}, only {CURRENT_ALGORITHM_TAG} is defined"
            )));
        }
        let hmac = hmac
            .parse::<HmacHash>()
            .map_err(|_| CodecError::MalformedRecord(format!("unsupported hmac {hmac:?}")))?;
        let iterations = parse_iterations(iterations)?;

        let salt = decode_b64(salt, "salt")?;
        if salt.is_empty() {
            return Err(CodecError::MalformedRecord("salt is empty".into()));
        }
        let digest = decode_b64(digest, "digest")?;
        if digest.is_empty() {
            return Err(CodecError::MalformedRecord("digest is empty".into()));
        }

        Ok(Self {
            hmac,
            iterations,
            salt,
            digest,
        })
    }

    /// Re-derives with the stored salt, iterations, hmac and key length and
    /// compares in constant time.
    pub fn verify(&self, password: &[u8]) -> bool {
        let mut candidate = vec![0u8; self.digest.len()];
        match pbkdf2(self.hmac, password, &self.salt, self.iterations, &mut candidate) {
            Ok(()) => constant_time_eq(&candidate, &self.digest),
            Err(_) => false,
        }
    }

    pub fn hmac(&self) -> HmacHash {
        self.hmac
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Digest byte length
    pub fn key_length(&self) -> usize {
        self.digest.len()
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Display for CurrentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}${}${}${}${}",
            CURRENT_ALGORITHM_TAG,
            self.hmac,
            self.iterations,
            encode_b64(&self.salt),
            encode_b64(&self.digest)
        )
    }
}
