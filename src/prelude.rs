//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use chatproxy::prelude::*;
//! ```
//!
//! This will import:
//! - The client and its per-call options (ChatProxy, SendMessageOptions, PendingReply)
//! - Configuration (ProxyConfig)
//! - Model types (ChatResult, MessageAction, Role)
//! - Errors (ProxyError, ProxyResult, ErrorCategory)
//! - The cancellation token type

pub use crate::proxy::{ChatProxy, PendingReply, SendMessageOptions};

pub use crate::config::ProxyConfig;

pub use crate::models::{ChatResult, MessageAction, Role};

pub use crate::error::{ErrorCategory, ProxyError, ProxyResult};

pub use tokio_util::sync::CancellationToken;
