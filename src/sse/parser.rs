//! Stateful SSE parser
//!
//! Bytes go in through [`SseParser::feed`] in whatever chunks the transport
//! delivers; complete records come out. Incomplete lines stay buffered as raw
//! bytes, so a chunk may end anywhere, including inside a UTF-8 sequence or
//! between the `\r` and `\n` of a line ending.

use crate::sse::events::{EventKind, SseLine, StreamEvent};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim_start().to_string());
    }

    // A line without a colon is a field name with an empty value
    let (field, value) = match line.split_once(':') {
        Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };

    match field {
        "event" => SseLine::Event(value.to_string()),
        "data" => SseLine::Data(value.to_string()),
        "id" if !value.contains('\0') => SseLine::Id(value.to_string()),
        "retry" => match value.parse::<u64>() {
            Ok(ms) if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                SseLine::Retry(ms)
            }
            _ => SseLine::Unknown(line.to_string()),
        },
        _ => SseLine::Unknown(line.to_string()),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete events
#[derive(Debug)]
pub struct SseParser {
    /// Bytes of the line currently being received
    line_buffer: Vec<u8>,
    /// Previous chunk ended on `\r`; a leading `\n` belongs to that line ending
    skip_lf: bool,
    /// Still at the very start of the stream (BOM not yet checked)
    at_start: bool,
    /// Current event name being accumulated
    current_event_type: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
    /// Whether the current record has seen a `data:` field
    has_data: bool,
    /// Persists across records
    last_event_id: Option<String>,
}

impl Default for SseParser {
    fn default() -> Self {
        Self {
            line_buffer: Vec::new(),
            skip_lf: false,
            at_start: true,
            current_event_type: None,
            data_buffer: Vec::new(),
            has_data: false,
            last_event_id: None,
        }
    }
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body, returning every record it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let mut rest = chunk;

        if self.skip_lf {
            if let Some((&b'\n', tail)) = rest.split_first() {
                rest = tail;
            }
            if !chunk.is_empty() {
                self.skip_lf = false;
            }
        }

        while let Some(pos) = rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            self.line_buffer.extend_from_slice(&rest[..pos]);
            let terminator = rest[pos];
            rest = &rest[pos + 1..];

            if terminator == b'\r' {
                match rest.first() {
                    Some(b'\n') => rest = &rest[1..],
                    Some(_) => {}
                    None => self.skip_lf = true,
                }
            }

            let line = self.take_line();
            if let Some(event) = self.feed_line(&line) {
                events.push(event);
            }
        }

        self.line_buffer.extend_from_slice(rest);
        events
    }

    /// Feed one complete line (without its terminator).
    ///
    /// Returns a record when the line completes one: a blank line after at
    /// least one `data:` field, or a valid `retry:` field.
    pub fn feed_line(&mut self, line: &str) -> Option<StreamEvent> {
        match parse_sse_line(line) {
            SseLine::Event(name) => {
                self.current_event_type = Some(name);
                None
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                self.has_data = true;
                None
            }
            SseLine::Id(id) => {
                self.last_event_id = if id.is_empty() { None } else { Some(id) };
                None
            }
            SseLine::Retry(ms) => Some(StreamEvent {
                kind: EventKind::ReconnectInterval,
                event: None,
                id: self.last_event_id.clone(),
                data: ms.to_string(),
            }),
            SseLine::Empty => self.try_emit_event(),
            SseLine::Comment(_) | SseLine::Unknown(_) => None,
        }
    }

    /// Signal end of input.
    ///
    /// A record still missing its terminating blank line is discarded.
    /// Returns true when something was dropped.
    pub fn finish(&mut self) -> bool {
        let had_partial = !self.is_idle();
        self.reset();
        had_partial
    }

    /// Whether no partial line or record is buffered.
    pub fn is_idle(&self) -> bool {
        self.line_buffer.is_empty() && !self.has_data && self.current_event_type.is_none()
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn take_line(&mut self) -> String {
        let mut bytes = std::mem::take(&mut self.line_buffer);
        if self.at_start {
            self.at_start = false;
            if bytes.starts_with(BOM) {
                bytes.drain(..BOM.len());
            }
        }
        match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    /// Try to emit a complete event from accumulated state
    fn try_emit_event(&mut self) -> Option<StreamEvent> {
        let event_type = self.current_event_type.take();
        let has_data = std::mem::take(&mut self.has_data);
        let data_lines = std::mem::take(&mut self.data_buffer);

        // Records without a data field are not dispatched
        if !has_data {
            return None;
        }

        Some(StreamEvent {
            kind: EventKind::Event,
            event: event_type,
            id: self.last_event_id.clone(),
            data: data_lines.join("\n"),
        })
    }
}
