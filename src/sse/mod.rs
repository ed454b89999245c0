//! SSE (Server-Sent Events) frame parser
//!
//! Turns the raw response body into discrete records. SSE format consists of:
//! - `event: <name>` - record name
//! - `data: <payload>` - payload line, repeatable
//! - `id: <id>` / `retry: <ms>` - last event id and reconnect interval
//! - Empty line - signals end of record
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - SseLine, EventKind, StreamEvent
//! - `parser` - SseParser and parse_sse_line

mod events;
mod parser;

// Re-export public types
pub use events::{EventKind, SseLine, StreamEvent};
pub use parser::{parse_sse_line, SseParser};
