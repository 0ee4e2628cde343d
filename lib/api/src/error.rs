//! Error types for the guarded request surface.
//!
//! Screens match on these to render their own failure states; the session
//! consequences of a 401 are already handled by the time the error is
//! returned.

use std::fmt;

/// Failures of requests on the guarded surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The base URL or a derived endpoint could not be parsed.
    InvalidBaseUrl { details: String },
    /// The credential was rejected. The session core has been notified and
    /// is redirecting to login; the caller only needs to render its normal
    /// request failure.
    Unauthorized,
    /// A non-success response other than 401.
    Status { status: u16, message: String },
    /// Transport-level failure before a response arrived.
    Network { details: String },
    /// The response body could not be decoded.
    Decode { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl { details } => {
                write!(f, "invalid API base URL: {details}")
            }
            Self::Unauthorized => write!(f, "request was not authorized"),
            Self::Status { status, message } => {
                write!(f, "request failed with status {status}: {message}")
            }
            Self::Network { details } => write!(f, "network error: {details}"),
            Self::Decode { details } => write!(f, "failed to decode response: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}
