//! Error types for the cache and secret-resolution subsystems.

use std::fmt;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cache and secret framework.
///
/// All operations return `Result<T>` where `Result` is defined as `std::result::Result<T, Error>`.
/// Different variants represent different failure modes:
#[derive(Debug, Clone)]
pub enum Error {
    /// Invalid configuration supplied to a cache or secret subsystem constructor.
    ///
    /// Common causes:
    /// - A negative TTL was passed to `Cache::try_new_millis`
    /// - `SECRET_MANAGER` names a backend that isn't one of the recognized enum values
    /// - `SECRET_CACHE_TTL` is not a parseable duration string
    InvalidConfig(String),

    /// A `secret://` reference was encountered but no Provider is bound to the Resolver.
    NotConfigured(String),

    /// Opaque wrapper over a backend error. Includes the secret name in its message.
    ///
    /// **Recovery:** Backend-dependent. Transport/auth failures are often transient;
    /// wrap the call in [`crate::backoff::retry`] with a `Retryable` marker if so.
    ProviderFailure(String),

    /// A `secret://` reference, or a JSON-expansion path, was malformed.
    ///
    /// Raised by the JSON expander when a path segment is absent (`missing key`) or
    /// a non-terminal segment isn't an object / a terminal isn't a string leaf
    /// (`not a string or nested field`).
    MalformedReference(String),

    /// Materialization to disk was refused, or an I/O error occurred.
    ///
    /// Common causes:
    /// - `SECRETS_DIR` already exists with permissions broader than 0700
    /// - The directory or file could not be created/written
    FilesystemFailure(String),

    /// A suspension point (loader wait, retry delay) observed cancellation.
    Canceled,

    /// Wraps an inner error to mark it eligible for another attempt by
    /// [`crate::backoff::retry`]. Carries no business semantics beyond "try again".
    Retryable(Box<Error>),

    /// The requested capability (version create/destroy, a specific backend) is not
    /// available in this build. Not an error condition by itself - callers treat it as
    /// a capability narrowing, not a failure of the operation that was actually requested.
    NotImplemented(String),

    /// Generic error with a custom message.
    Other(String),
}

impl Error {
    /// Wrap `self` so the retry driver treats it as eligible for another attempt.
    pub fn retryable(self) -> Self {
        Error::Retryable(Box::new(self))
    }

    /// True iff this error (or the error it wraps) was marked [`Error::retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Retryable(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Error::NotConfigured(msg) => write!(f, "not configured: {}", msg),
            Error::ProviderFailure(msg) => write!(f, "provider failure: {}", msg),
            Error::MalformedReference(msg) => write!(f, "malformed reference: {}", msg),
            Error::FilesystemFailure(msg) => write!(f, "filesystem failure: {}", msg),
            Error::Canceled => write!(f, "canceled"),
            Error::Retryable(inner) => write!(f, "{}", inner),
            Error::NotImplemented(msg) => write!(f, "not implemented: {}", msg),
            Error::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedReference(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::FilesystemFailure(e.to_string())
    }
}

impl From<humantime::DurationError> for Error {
    fn from(e: humantime::DurationError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ProviderFailure("db-password".to_string());
        assert_eq!(err.to_string(), "provider failure: db-password");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_retryable_roundtrip() {
        let err = Error::ProviderFailure("flaky".to_string()).retryable();
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "provider failure: flaky");

        let bare = Error::ProviderFailure("flaky".to_string());
        assert!(!bare.is_retryable());
    }
}
