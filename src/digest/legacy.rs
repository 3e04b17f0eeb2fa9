//! Legacy broker password format
//!
//! `$6$<salt>$<digest>` for salted SHA512 and
//! `$7$<iterations>$<salt>$<digest>` for PBKDF2-HMAC-SHA512. Salts are
//! always 12 bytes and digests always 64 bytes.

use std::fmt;
use std::num::IntErrorKind;

use crate::digest::encoding::{
    constant_time_eq, decode_b64, encode_b64, pbkdf2, random_salt, sha512_salted,
};
use crate::digest::record::strip_username;
use crate::digest::scheme::{
    HmacHash, LEGACY_DIGEST_LEN, LEGACY_MAX_PASSWORD_LEN, LEGACY_SALT_LEN, LegacyAlgorithm,
    LegacyParams,
};
use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDigest {
    algorithm: LegacyAlgorithm,
    salt: [u8; LEGACY_SALT_LEN],
    /// Always 1 for SHA512; kept so both algorithms re-derive the same way.
    iterations: u32,
    digest: [u8; LEGACY_DIGEST_LEN],
}

impl LegacyDigest {
    /// Derives a digest with a fresh random salt.
    pub fn derive(password: &[u8], params: &LegacyParams) -> Result<Self, CodecError> {
        Self::derive_with_salt(password, params, &random_salt(LEGACY_SALT_LEN))
    }

    /// Derives a digest with a caller-supplied salt, which must be exactly
    /// 12 bytes.
    pub fn derive_with_salt(
        password: &[u8],
        params: &LegacyParams,
        salt: &[u8],
    ) -> Result<Self, CodecError> {
        params.validate()?;
        if password.len() > LEGACY_MAX_PASSWORD_LEN {
            return Err(CodecError::InvalidParameter(format!(
                "password should have at most {LEGACY_MAX_PASSWORD_LEN} bytes, got {}",
                password.len()
            )));
        }
        let salt: [u8; LEGACY_SALT_LEN] = salt.try_into().map_err(|_| {
            CodecError::InvalidParameter(format!(
                "password salt has to consist of exactly {LEGACY_SALT_LEN} bytes, got {}",
                salt.len()
            ))
        })?;

        let iterations = match params.algorithm {
            LegacyAlgorithm::Sha512 => 1,
            LegacyAlgorithm::Pbkdf2Sha512 => params.iterations,
        };
        let digest = hash(params.algorithm, password, &salt, iterations)?;

        Ok(Self {
            algorithm: params.algorithm,
            salt,
            iterations,
            digest,
        })
    }

    /// Parses `[username:]$6$salt$digest` or `[username:]$7$iter$salt$digest`.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let body = strip_username(text).trim_matches('$');
        let parts: Vec<&str> = body.split('$').collect();
        let tag = parts.first().and_then(|t| t.parse::<u8>().ok());

        let (algorithm, iterations, salt, digest) = match (parts.len(), tag) {
            (3, Some(6)) => (LegacyAlgorithm::Sha512, 1, parts[1], parts[2]),
            (4, Some(7)) => {
                let iterations = parse_iterations(parts[1])?;
                (LegacyAlgorithm::Pbkdf2Sha512, iterations, parts[2], parts[3])
            }
            _ => {
                return Err(CodecError::MalformedRecord(
                    "could not parse input string as a $6$ or $7$ password hash".into(),
                ));
            }
        };

        let salt = decode_b64(salt, "salt")?;
        let salt: [u8; LEGACY_SALT_LEN] = salt.as_slice().try_into().map_err(|_| {
            CodecError::MalformedRecord(format!(
                "salt must be {LEGACY_SALT_LEN} bytes, got {}",
                salt.len()
            ))
        })?;
        let digest = decode_b64(digest, "digest")?;
        let digest: [u8; LEGACY_DIGEST_LEN] = digest.as_slice().try_into().map_err(|_| {
            CodecError::MalformedRecord(format!(
                "digest must be {LEGACY_DIGEST_LEN} bytes, got {}",
                digest.len()
            ))
        })?;

        Ok(Self {
            algorithm,
            salt,
            iterations,
            digest,
        })
    }

    /// Re-derives with the stored salt and iterations and compares in
    /// constant time.
    pub fn verify(&self, password: &[u8]) -> bool {
        match hash(self.algorithm, password, &self.salt, self.iterations) {
            Ok(candidate) => constant_time_eq(&candidate, &self.digest),
            Err(_) => false,
        }
    }

    pub fn algorithm(&self) -> LegacyAlgorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Display for LegacyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let salt = encode_b64(&self.salt);
        let digest = encode_b64(&self.digest);
        match self.algorithm {
            LegacyAlgorithm::Sha512 => write!(f, "${}${}${}", self.algorithm.tag(), salt, digest),
            LegacyAlgorithm::Pbkdf2Sha512 => write!(
                f,
                "${}${}${}${}",
                self.algorithm.tag(),
                self.iterations,
                salt,
                digest
            ),
        }
    }
}

fn hash(
    algorithm: LegacyAlgorithm,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<[u8; LEGACY_DIGEST_LEN], CodecError> {
    match algorithm {
        LegacyAlgorithm::Sha512 => Ok(sha512_salted(password, salt)),
        LegacyAlgorithm::Pbkdf2Sha512 => {
            let mut out = [0u8; LEGACY_DIGEST_LEN];
            pbkdf2(HmacHash::Sha512, password, salt, iterations, &mut out)?;
            Ok(out)
        }
    }
}

pub(crate) fn parse_iterations(field: &str) -> Result<u32, CodecError> {
    match field.parse::<u32>() {
        Ok(0) => Err(CodecError::MalformedRecord(
            "iteration count must be at least 1".into(),
        )),
        Ok(n) => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(CodecError::MalformedRecord(
            format!("iteration count {field} exceeds {}", u32::MAX),
        )),
        Err(_) => Err(CodecError::MalformedRecord(format!(
            "iteration count {field:?} is not a number"
        ))),
    }
}
