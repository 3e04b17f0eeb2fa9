//! Primitives shared by both digest formats: key derivation, salt
//! generation, base64 and constant-time comparison.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::Hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256, Sha512};

use crate::digest::scheme::HmacHash;
use crate::error::CodecError;

/// Fresh salt from the operating system's CSPRNG
pub fn random_salt(len: usize) -> Vec<u8> {
    let mut salt = vec![0u8; len];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// PBKDF2-HMAC over the chosen hash, filling `out` completely
pub fn pbkdf2(
    hmac: HmacHash,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    out: &mut [u8],
) -> Result<(), CodecError> {
    if iterations == 0 {
        return Err(CodecError::InvalidParameter(
            "PBKDF2 iterations must be at least 1".into(),
        ));
    }

    let result = match hmac {
        HmacHash::Sha256 => ::pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, out),
        HmacHash::Sha512 => ::pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, iterations, out),
    };
    result.map_err(|e| CodecError::InvalidParameter(format!("PBKDF2 failed: {e}")))
}

/// Single-pass `SHA512(password || salt)`
pub fn sha512_salted(password: &[u8], salt: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(password);
    hasher.update(salt);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

pub fn encode_b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Strict standard-alphabet decode with padding
pub fn decode_b64(field: &str, what: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(field)
        .map_err(|e| CodecError::MalformedRecord(format!("{what} is not valid base64: {e}")))
}

/// Compares every byte regardless of where the first difference is.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
