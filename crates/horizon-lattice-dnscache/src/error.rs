//! Error types for the DNS cache.

use thiserror::Error;

/// Boxed error returned by resolution backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while looking up names through the cache.
#[derive(Error, Debug)]
pub enum DnsCacheError {
    /// The resolution backend failed or returned no addresses.
    #[error("failed to resolve {host}: {source}")]
    ResolutionFailed {
        /// The normalized name that was being resolved.
        host: String,
        /// The error reported by the backend.
        #[source]
        source: BoxError,
    },

    /// The lookup context was cancelled while waiting for the backend.
    #[error("lookup was cancelled")]
    Cancelled,

    /// The lookup context deadline passed while waiting for the backend.
    #[error("lookup deadline exceeded")]
    DeadlineExceeded,

    /// The name is empty or otherwise unusable as a cache key.
    #[error("invalid host name: {0:?}")]
    InvalidHost(String),

    /// The backend configuration is invalid.
    #[error("invalid resolver configuration: {0}")]
    Configuration(String),
}

impl DnsCacheError {
    /// Wrap a backend error for the given host.
    pub fn resolution_failed(host: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ResolutionFailed {
            host: host.into(),
            source: source.into(),
        }
    }

    /// Returns `true` if the error was caused by the lookup context ending.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// A specialized Result type for DNS cache operations.
pub type Result<T> = std::result::Result<T, DnsCacheError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_resolution_failed_keeps_source() {
        let err = DnsCacheError::resolution_failed("example.com", "no such host");
        assert_eq!(err.to_string(), "failed to resolve example.com: no such host");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("no such host"));
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_cancellation_variants() {
        assert!(DnsCacheError::Cancelled.is_cancellation());
        assert!(DnsCacheError::DeadlineExceeded.is_cancellation());
        assert!(!DnsCacheError::InvalidHost(String::new()).is_cancellation());
    }
}
