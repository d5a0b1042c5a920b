//! Buffered Server-Sent Events decoder
//!
//! Events end at a blank line. Bytes are buffered until a full event has
//! arrived, so an event split across network chunks (including in the
//! middle of a multi-byte UTF-8 sequence) decodes the same as one that
//! arrived whole.

/// A parsed SSE event
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Event type from the `event:` field
    pub event_type: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// Event ID from the `id:` field
    pub id: Option<String>,
}

impl SseEvent {
    /// Create an untyped event
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            event_type: None,
            data: data.into(),
            id: None,
        }
    }

    /// Create an event with a type
    pub fn with_type(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            data: data.into(),
            id: None,
        }
    }
}

/// Incremental SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every event completed by them
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, delimiter_len)) = self.find_event_boundary() {
            let raw: Vec<u8> = self.buffer.drain(..end + delimiter_len).collect();
            let text = String::from_utf8_lossy(&raw[..end]);
            if let Some(event) = parse_event(&text) {
                events.push(event);
            }
        }
        events
    }

    /// Whether a partial event is still buffered
    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Earliest blank-line boundary as (event length, delimiter length)
    fn find_event_boundary(&self) -> Option<(usize, usize)> {
        let lf = find(&self.buffer, b"\n\n").map(|pos| (pos, 2));
        let crlf = find(&self.buffer, b"\r\n\r\n").map(|pos| (pos, 4));

        match (lf, crlf) {
            (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
            (a, b) => a.or(b),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse one event block into an `SseEvent`; blocks without data are dropped
fn parse_event(text: &str) -> Option<SseEvent> {
    let mut event_type = None;
    let mut data_lines: Vec<&str> = Vec::new();
    let mut id = None;

    for line in text.lines() {
        // Comment / keep-alive line
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => event_type = Some(value.to_string()),
            "data" => data_lines.push(value),
            "id" => id = Some(value.to_string()),
            // retry: and unknown fields are ignored
            _ => {}
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseEvent {
        event_type,
        data: data_lines.join("\n"),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: endpoint\ndata: /messages/?session_id=abc123\n\n");

        assert_eq!(
            events,
            vec![SseEvent::with_type("endpoint", "/messages/?session_id=abc123")]
        );
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_partial_chunks() {
        let mut decoder = SseDecoder::new();

        assert!(decoder.feed(b"event: message\ndata: {\"jsonrpc\":").is_empty());
        assert!(decoder.has_remaining());

        let events = decoder.feed(b"\"2.0\"}\n\nevent: message\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"jsonrpc\":\"2.0\"}");
        assert!(decoder.has_remaining());
    }

    #[test]
    fn test_split_utf8_sequence() {
        let mut decoder = SseDecoder::new();
        let payload = "data: Miraidon ミライドン\n\n".as_bytes();
        // Split inside the first katakana character
        let split = payload.iter().position(|&b| b >= 0x80).unwrap() + 1;

        assert!(decoder.feed(&payload[..split]).is_empty());
        let events = decoder.feed(&payload[split..]);
        assert_eq!(events[0].data, "Miraidon ミライドン");
    }

    #[test]
    fn test_crlf_comments_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": ping\r\nid: 7\r\ndata: line one\r\ndata: line two\r\n\r\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "line one\nline two");
        assert_eq!(events[0].id.as_deref(), Some("7"));
        assert_eq!(events[0].event_type, None);
    }

    #[test]
    fn test_keepalive_without_data_is_dropped() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b": keep-alive\n\n").is_empty());
        assert!(decoder.feed(b"event: heartbeat\n\n").is_empty());
    }

    #[test]
    fn test_only_one_leading_space_is_stripped() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data:  indented\n\n");
        assert_eq!(events[0].data, " indented");
    }
}
