//! Error types for the session crate.
//!
//! Decode errors are soft: callers treat them as "no session" so that a stale
//! or corrupted cookie never blocks the user from logging in again.

use std::fmt;

/// Errors from opening a session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The cookie did not verify (or decrypt) under the current or previous key.
    Unverified { cookie: String },
    /// The cookie verified but its payload could not be read.
    MalformedPayload { cookie: String, reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified { cookie } => {
                write!(f, "session cookie '{cookie}' failed verification")
            }
            Self::MalformedPayload { cookie, reason } => {
                write!(f, "session cookie '{cookie}' has a malformed payload: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unverified_display() {
        let err = SessionError::Unverified {
            cookie: "serfr0".to_string(),
        };
        assert!(err.to_string().contains("serfr0"));
        assert!(err.to_string().contains("verification"));
    }

    #[test]
    fn malformed_payload_display() {
        let err = SessionError::MalformedPayload {
            cookie: "serfr0".to_string(),
            reason: "expected value at line 1".to_string(),
        };
        assert!(err.to_string().contains("malformed"));
        assert!(err.to_string().contains("line 1"));
    }
}
