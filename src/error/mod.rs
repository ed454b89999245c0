//! Error handling for the proxy client.
//!
//! - **Categories**: coarse classification for handling decisions
//! - **Network errors**: transport failures below the HTTP status line
//! - **`ProxyError`**: the single error type every operation returns
//! - **`ProxyResult<T>`**: result alias used throughout the crate
//!
//! # Example
//!
//! ```ignore
//! use chatproxy::error::ProxyError;
//!
//! match proxy.send_message("Hello", options).await {
//!     Ok(reply) => println!("{}", reply.text),
//!     Err(err) if err.is_retryable() => eprintln!("transient: {}", err),
//!     Err(err) => eprintln!("{}: {}", err.error_code(), err),
//! }
//! ```
//!
//! | Variant | Category | Retryable |
//! |---------|----------|-----------|
//! | InvalidRequest | Client | No |
//! | Backend | Server / Auth / Client | 5xx and 429 |
//! | Network | Network | Yes |
//! | Timeout | Network | Yes |
//! | Cancelled | User | No |

mod category;
mod network;
mod proxy_error;

pub use category::ErrorCategory;
pub use network::NetworkError;
pub use proxy_error::ProxyError;

/// Type alias for Results using [`ProxyError`].
pub type ProxyResult<T> = Result<T, ProxyError>;
