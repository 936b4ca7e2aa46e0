//! Server-sent events framing.
//!
//! Bytes arrive in arbitrary chunks; `SseLineBuffer` reassembles lines and
//! `SseEventParser` groups them into events at blank-line boundaries.

/// Default event name when a block has no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// Reassembles newline-terminated lines from a byte stream.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    /// Append a chunk and return every completed line, blank lines included.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        self.drain_lines(false)
    }

    /// Return whatever is left, treating it as a final line.
    pub fn finish(&mut self) -> Vec<String> {
        self.drain_lines(true)
    }

    fn drain_lines(&mut self, flush: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let mut search_index = 0;

        while let Some(relative_pos) = self.buffer[search_index..].iter().position(|b| *b == b'\n')
        {
            let newline_index = search_index + relative_pos;
            let mut line_end = newline_index;
            if line_end > search_index && self.buffer[line_end - 1] == b'\r' {
                line_end -= 1;
            }

            lines.push(String::from_utf8_lossy(&self.buffer[search_index..line_end]).into_owned());
            search_index = newline_index + 1;
        }

        if flush {
            if search_index < self.buffer.len() {
                lines.push(String::from_utf8_lossy(&self.buffer[search_index..]).into_owned());
            }
            self.buffer.clear();
        } else if search_index > 0 {
            self.buffer.drain(..search_index);
        }

        lines
    }
}

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental event parser.
#[derive(Debug, Default)]
pub struct SseEventParser {
    lines: SseLineBuffer,
    event: Option<String>,
    data: Vec<String>,
}

impl SseEventParser {
    /// Feed a chunk and return every completed event.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let lines = self.lines.push(chunk);
        lines.iter().filter_map(|line| self.process_line(line)).collect()
    }

    /// Flush at end of stream, dispatching a trailing unterminated event.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let lines = self.lines.finish();
        let mut events: Vec<SseEvent> =
            lines.iter().filter_map(|line| self.process_line(line)).collect();
        events.extend(self.dispatch());
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':').map_or((line, ""), |(field, value)| {
            (field, value.strip_prefix(' ').unwrap_or(value))
        });
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}

/// Whether a `Content-Type` header value denotes an event stream.
pub fn is_event_stream_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case("text/event-stream"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_handles_partial_lines() {
        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(b"data: one").is_empty());
        assert_eq!(buffer.push(b"\r\n\n"), vec!["data: one", ""]);
        assert!(buffer.finish().is_empty());
    }

    #[test]
    fn test_parser_splits_events() {
        let mut parser = SseEventParser::default();
        let events = parser.push(b"event: endpoint\ndata: /messages?session_id=abc\n\ndata: {\"id\"");
        assert_eq!(
            events,
            vec![SseEvent {
                event: "endpoint".to_string(),
                data: "/messages?session_id=abc".to_string()
            }]
        );

        let events = parser.push(b":1}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, DEFAULT_EVENT);
        assert_eq!(events[0].data, "{\"id\":1}");
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let mut parser = SseEventParser::default();
        let events = parser.push(b": ping\ndata: a\ndata: b\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn test_finish_dispatches_trailing_event() {
        let mut parser = SseEventParser::default();
        assert!(parser.push(b"data: last").is_empty());
        let events = parser.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "last");
    }

    #[test]
    fn test_detects_event_stream_content_type() {
        assert!(is_event_stream_content_type("text/event-stream; charset=utf-8"));
        assert!(!is_event_stream_content_type("application/json"));
    }
}
