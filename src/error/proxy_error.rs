//! The error type returned by every proxy operation.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

use super::category::ErrorCategory;
use super::network::NetworkError;

/// Terminal outcome of a failed call.
///
/// Each call settles with exactly one of these or a result; a partial reply is
/// never returned alongside an error. Malformed stream frames are not errors
/// and never surface here.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The caller broke the request contract; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The backend answered with a non-success status.
    #[error("backend error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error(transparent)]
    Network(#[from] NetworkError),

    /// No terminal condition was reached before the deadline.
    #[error("request timed out after {}ms", .duration.as_millis())]
    Timeout { duration: Duration },

    #[error("request cancelled")]
    Cancelled,

    /// A 2xx response whose body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProxyError {
    /// Get the high-level category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProxyError::InvalidRequest(_) => ErrorCategory::Client,
            ProxyError::Backend { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            ProxyError::Network(_) | ProxyError::Timeout { .. } => ErrorCategory::Network,
            ProxyError::Cancelled => ErrorCategory::User,
            ProxyError::MalformedResponse(_) => ErrorCategory::Server,
            ProxyError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Check if the caller could reasonably try again.
    pub fn is_retryable(&self) -> bool {
        match self {
            // 429 is a client status but clears on its own.
            ProxyError::Backend { status: 429, .. } => true,
            _ => self.category().is_retryable(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProxyError::InvalidRequest(_) => "E_INVALID_REQUEST",
            ProxyError::Backend { .. } => "E_BACKEND",
            ProxyError::Network(err) => err.error_code(),
            ProxyError::Timeout { .. } => "E_TIMEOUT",
            ProxyError::Cancelled => "E_CANCELLED",
            ProxyError::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
            ProxyError::Config(_) => "E_CONFIG",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProxyError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProxyError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_display_carries_status_and_body() {
        let err = ProxyError::Backend {
            status: 500,
            body: "server overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "backend error 500: server overloaded");
    }

    #[test]
    fn test_timeout_display() {
        let err = ProxyError::Timeout {
            duration: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "request timed out after 1500ms");
    }

    #[test]
    fn test_network_display_is_transparent() {
        let err: ProxyError = NetworkError::ConnectionFailed("refused".to_string()).into();
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ProxyError::InvalidRequest("x".to_string()).category(),
            ErrorCategory::Client
        );
        assert_eq!(
            ProxyError::Backend {
                status: 401,
                body: String::new()
            }
            .category(),
            ErrorCategory::Auth
        );
        assert_eq!(
            ProxyError::Backend {
                status: 503,
                body: String::new()
            }
            .category(),
            ErrorCategory::Server
        );
        assert_eq!(
            ProxyError::Backend {
                status: 404,
                body: String::new()
            }
            .category(),
            ErrorCategory::Client
        );
        assert_eq!(ProxyError::Cancelled.category(), ErrorCategory::User);
        assert_eq!(
            ProxyError::Timeout {
                duration: Duration::from_secs(1)
            }
            .category(),
            ErrorCategory::Network
        );
        assert_eq!(
            ProxyError::Config(ConfigError::MissingAccessToken).category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_retry_hints() {
        assert!(ProxyError::Backend {
            status: 502,
            body: String::new()
        }
        .is_retryable());
        assert!(ProxyError::Backend {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(!ProxyError::Backend {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!ProxyError::InvalidRequest("x".to_string()).is_retryable());
        assert!(!ProxyError::Cancelled.is_retryable());
        assert!(ProxyError::Timeout {
            duration: Duration::from_secs(1)
        }
        .is_retryable());
    }

    #[test]
    fn test_predicates() {
        assert!(ProxyError::Cancelled.is_cancelled());
        assert!(!ProxyError::Cancelled.is_timeout());
        assert!(ProxyError::Timeout {
            duration: Duration::from_secs(1)
        }
        .is_timeout());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ProxyError::Cancelled.error_code(), "E_CANCELLED");
        assert_eq!(
            ProxyError::from(NetworkError::StreamInterrupted(String::new())).error_code(),
            "E_NET_STREAM"
        );
    }
}
