//! chatproxy - streaming client for a conversational text-generation backend
//!
//! One call sends a prompt and consumes the Server-Sent Events reply:
//! `sse` frames the bytes, `interpreter` decodes each record, `accumulator`
//! folds the deltas into a `ChatResult`, and `proxy` runs the request with a
//! deadline and a cancellation token.
//!
//! This library exposes modules for use in integration tests.

pub mod accumulator;
pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod logging;
pub mod models;
pub mod prelude;
pub mod proxy;
pub mod sse;
pub mod traits;
