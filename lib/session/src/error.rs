//! Error taxonomy for session operations.
//!
//! These are the failures a screen shows inline; they carry no secrets and
//! map one-to-one onto the backend's observable behavior. None of them
//! schedule a retry; resubmission is always a user action.

use std::fmt;

/// Failures of authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The backend rejected the submitted credentials (HTTP 401 on login,
    /// or a wrong current password on a password change).
    InvalidCredentials,
    /// The backend throttled the attempt (HTTP 429).
    RateLimited,
    /// A previously accepted credential was rejected on an authenticated
    /// call; the session core redirects to login in the background.
    SessionExpired,
    /// Transport failure, server error, or a malformed response.
    RequestFailed { details: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::RateLimited => write!(f, "too many attempts, please try again later"),
            Self::SessionExpired => write!(f, "session has expired"),
            Self::RequestFailed { details } => write!(f, "request failed: {details}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_display() {
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid username or password");
    }

    #[test]
    fn rate_limited_is_distinguishable_from_rejection() {
        assert_ne!(
            AuthError::RateLimited.to_string(),
            AuthError::InvalidCredentials.to_string()
        );
    }

    #[test]
    fn request_failed_carries_details() {
        let err = AuthError::RequestFailed {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
