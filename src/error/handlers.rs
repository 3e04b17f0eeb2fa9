//! Error classification
//!
//! Maps concrete errors onto the flat taxonomy callers branch on.

use crate::error::types::{CodecError, CredentialError, StoreError};

/// Flat error taxonomy shared by the codec and both store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    Malformed,
    UserNotFound,
    UserExists,
    PathNotFound,
    Io,
}

impl ErrorKind {
    /// Expected outcomes callers routinely branch on, as opposed to bugs
    /// or corruption.
    pub fn is_control_flow(self) -> bool {
        matches!(self, ErrorKind::UserNotFound | ErrorKind::UserExists)
    }
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            CodecError::MalformedRecord(_) => ErrorKind::Malformed,
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidUsername(_) | StoreError::InvalidDigestText { .. } => {
                ErrorKind::InvalidParameter
            }
            StoreError::UserNotFound(_) => ErrorKind::UserNotFound,
            StoreError::UserExists(_) => ErrorKind::UserExists,
            StoreError::MalformedStore { .. } => ErrorKind::Malformed,
            StoreError::PathNotFound(_) => ErrorKind::PathNotFound,
            StoreError::Io { .. } | StoreError::Database { .. } => ErrorKind::Io,
            StoreError::Codec(e) => e.kind(),
        }
    }
}

impl CredentialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredentialError::Codec(e) => e.kind(),
            CredentialError::Store(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn conflict_outcomes_are_control_flow() {
        let missing = CredentialError::from(StoreError::UserNotFound("alice".into()));
        let taken = CredentialError::from(StoreError::UserExists("alice".into()));
        assert_eq!(missing.kind(), ErrorKind::UserNotFound);
        assert!(missing.kind().is_control_flow());
        assert!(taken.kind().is_control_flow());
    }

    #[test]
    fn corruption_and_bugs_are_not_control_flow() {
        let corrupt = StoreError::MalformedStore {
            path: PathBuf::from("/etc/mosquitto/passwd"),
            line: 3,
            reason: "expected exactly one ':'".into(),
        };
        assert_eq!(corrupt.kind(), ErrorKind::Malformed);
        assert!(!corrupt.kind().is_control_flow());

        let nested = StoreError::from(CodecError::InvalidParameter("iterations".into()));
        assert_eq!(nested.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn messages_carry_context() {
        let err = StoreError::PathNotFound(PathBuf::from("/nope/passwd"));
        assert_eq!(err.to_string(), "Path /nope/passwd does not exist");

        let err = StoreError::MalformedStore {
            path: PathBuf::from("passwd"),
            line: 2,
            reason: "empty username".into(),
        };
        assert!(err.to_string().contains("line 2"));
    }
}
