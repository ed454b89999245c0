//! Error category classification.
//!
//! Categories give callers a coarse handle on what went wrong so they can
//! pick a retry policy or a message without matching every variant.

use std::fmt;

/// Coarse grouping of [`super::ProxyError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport failures and deadlines. Generally transient.
    Network,

    /// The backend rejected the credential (HTTP 401/403).
    Auth,

    /// Backend-side failures (HTTP 5xx, unreadable responses).
    Server,

    /// The caller broke a request contract. Never retryable as-is.
    Client,

    /// The caller asked for the call to stop.
    User,

    /// Missing or invalid settings.
    Configuration,
}

impl ErrorCategory {
    /// Transient categories. A hint only; the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Lowercase label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// One-line advice shown under CLI errors.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your connection to the proxy and try again",
            ErrorCategory::Auth => "Check that the access token is current",
            ErrorCategory::Server => "The backend may be overloaded. Please try again later",
            ErrorCategory::Client => "Fix the request arguments before sending again",
            ErrorCategory::User => "The request was cancelled",
            ErrorCategory::Configuration => "Check your configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
