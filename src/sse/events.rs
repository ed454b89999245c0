//! SSE line and event types
//!
//! `SseLine` is one classified line of the stream, `StreamEvent` is a
//! dispatched record.

use std::time::Duration;

/// Represents a single parsed SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// `event:` field - names the record
    Event(String),
    /// `data:` field - one line of payload
    Data(String),
    /// `id:` field - last event id
    Id(String),
    /// `retry:` field with a valid reconnect interval in milliseconds
    Retry(u64),
    /// Blank line - terminates the record
    Empty,
    /// Line starting with `:`
    Comment(String),
    /// Unrecognized field, or a field with an invalid value
    Unknown(String),
}

/// What a dispatched record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A data record
    Event,
    /// A `retry:` instruction; `data` holds the interval in milliseconds
    ReconnectInterval,
}

/// One record decoded from the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub kind: EventKind,
    /// Value of the record's `event:` field
    pub event: Option<String>,
    /// Last event id seen on the stream
    pub id: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

impl StreamEvent {
    /// A data record with no name or id.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Event,
            event: None,
            id: None,
            data: data.into(),
        }
    }

    pub fn is_event(&self) -> bool {
        self.kind == EventKind::Event
    }

    /// The reconnect interval, for `ReconnectInterval` records.
    pub fn retry_interval(&self) -> Option<Duration> {
        match self.kind {
            EventKind::ReconnectInterval => self.data.parse().ok().map(Duration::from_millis),
            EventKind::Event => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructor() {
        let event = StreamEvent::message("payload");
        assert!(event.is_event());
        assert_eq!(event.data, "payload");
        assert!(event.event.is_none());
        assert_eq!(event.retry_interval(), None);
    }

    #[test]
    fn test_retry_interval() {
        let event = StreamEvent {
            kind: EventKind::ReconnectInterval,
            event: None,
            id: None,
            data: "3000".to_string(),
        };
        assert!(!event.is_event());
        assert_eq!(event.retry_interval(), Some(Duration::from_millis(3000)));
    }
}
