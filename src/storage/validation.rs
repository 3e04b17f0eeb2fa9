//! Username and digest-text validation
//!
//! Applied before any store mutation so a line of the password file can
//! never be split or broken by the values written into it.

use crate::error::StoreError;

/// Longest username the broker accepts, in bytes
pub const MAX_USERNAME_LEN: usize = 65536;

fn is_forbidden(c: char) -> bool {
    c.is_ascii_control() || c == '\u{2028}' || c == '\u{2029}'
}

/// Usernames must be non-empty, at most 65536 bytes and free of `:`, ASCII
/// control characters and Unicode line/paragraph separators.
pub fn validate_username(username: &str) -> Result<(), StoreError> {
    if username.is_empty()
        || username.len() > MAX_USERNAME_LEN
        || username.chars().any(|c| c == ':' || is_forbidden(c))
    {
        return Err(StoreError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Digest text is opaque to the stores but must still fit on one line
/// after the `username:` prefix.
pub fn validate_digest_text(username: &str, digest_text: &str) -> Result<(), StoreError> {
    let reason = if digest_text.is_empty() {
        "digest text is empty"
    } else if digest_text.contains(':') {
        "digest text contains ':'"
    } else if digest_text.chars().any(is_forbidden) {
        "digest text contains control characters"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidDigestText {
        username: username.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        let longest = "x".repeat(MAX_USERNAME_LEN);
        for name in ["alice", "sensor-01", "Bob Smith", "ümlaut", "a$b", longest.as_str()] {
            assert!(validate_username(name).is_ok(), "{name:?}");
        }
    }

    #[test]
    fn rejects_separators_and_controls() {
        let too_long = "x".repeat(MAX_USERNAME_LEN + 1);
        for name in [
            "",
            "ali:ce",
            "tab\there",
            "nul\0",
            "new\nline",
            "cr\r",
            "del\x7f",
            "line\u{2028}sep",
            "para\u{2029}sep",
            too_long.as_str(),
        ] {
            assert!(
                matches!(validate_username(name), Err(StoreError::InvalidUsername(_))),
                "{name:?}"
            );
        }
    }

    #[test]
    fn digest_text_must_fit_one_line() {
        assert!(validate_digest_text("u", "$7$101$abc=$def=").is_ok());
        assert!(validate_digest_text("u", "").is_err());
        assert!(validate_digest_text("u", "a:b").is_err());
        assert!(validate_digest_text("u", "abc\n").is_err());
    }
}
