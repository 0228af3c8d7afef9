//! Error types for status queries.

use std::time::Duration;
use thiserror::Error;

/// Convenience type alias for Results using [`QueryError`].
pub type Result<T, E = QueryError> = std::result::Result<T, E>;

/// Everything that can go wrong while asking a server for its status.
///
/// None of these are fatal to the caller: a failed query means the server
/// is shown as offline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The server did not answer within the configured budget.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// Socket-level failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure from the HTTP client.
    #[cfg(feature = "http")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP endpoint answered with a non-success status.
    #[error("unexpected http status {0}")]
    Status(u16),

    /// The host name did not resolve to any address.
    #[error("could not resolve {0}")]
    Resolve(String),

    /// The response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No query adapter is registered for this server kind.
    #[error("no adapter registered for kind '{0}'")]
    UnsupportedKind(String),
}

impl QueryError {
    /// Shorthand for [`QueryError::InvalidResponse`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidResponse(reason.into())
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Io(_) => "io",
            #[cfg(feature = "http")]
            Self::Http(_) => "http",
            Self::Status(_) => "status",
            Self::Resolve(_) => "resolve",
            Self::InvalidResponse(_) => "invalid_response",
            Self::UnsupportedKind(_) => "unsupported_kind",
        }
    }

    /// Whether this error was a timeout, regardless of which layer raised it.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            #[cfg(feature = "http")]
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(QueryError::Timeout(Duration::from_secs(1)).error_code(), "timeout");
        assert_eq!(QueryError::invalid("short read").error_code(), "invalid_response");
        assert_eq!(QueryError::Status(503).error_code(), "status");
    }

    #[test]
    fn test_timeout_detection() {
        assert!(QueryError::Timeout(Duration::from_millis(10)).is_timeout());
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert!(QueryError::Io(io).is_timeout());
        assert!(!QueryError::invalid("x").is_timeout());
    }

    #[test]
    fn test_display_carries_reason() {
        let err = QueryError::invalid("missing header");
        assert_eq!(err.to_string(), "invalid response: missing header");
    }
}
