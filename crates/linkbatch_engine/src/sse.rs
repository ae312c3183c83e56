//! Incremental `text/event-stream` decoder.
//!
//! Chunks may split lines anywhere; only complete lines are interpreted and
//! only a blank line dispatches a frame. An unterminated trailing frame is
//! dropped when the stream ends.

use bytes::{Buf, BytesMut};
use linkbatch_logging::lb_debug;

use crate::StreamEvent;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

impl SseFrame {
    /// Maps the frame onto the stream protocol; unknown event names yield `None`.
    pub fn into_stream_event(self) -> Option<StreamEvent> {
        match self.event.as_deref() {
            None | Some("message") => Some(StreamEvent::Message(self.data)),
            Some("complete") => Some(StreamEvent::Complete),
            Some("error") => Some(StreamEvent::Error(
                Some(self.data).filter(|data| !data.is_empty()),
            )),
            Some(other) => {
                lb_debug!("Ignoring unknown SSE event {:?}", other);
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every frame it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw = self.buffer.split_to(pos);
            self.buffer.advance(1);
            let line = String::from_utf8_lossy(&raw);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // Resumption is not supported, so ids and retry hints are unused.
            "id" | "retry" => {}
            other => lb_debug!("Ignoring SSE field {:?}", other),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take().filter(|name| !name.is_empty());
        if self.data.is_empty() && event.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame { event, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: Option<&str>, data: &str) -> SseFrame {
        SseFrame {
            event: event.map(ToOwned::to_owned),
            data: data.to_string(),
        }
    }

    #[test]
    fn decodes_server_output() {
        let mut decoder = SseDecoder::new();
        let body = concat!(
            ": connection established for task t1\n\n",
            "data: {\"link\":\"a\",\"status\":\"success\"}\n\n",
            "event: complete\ndata: {\"message\": \"Task completed\"}\n\n",
        );
        assert_eq!(
            decoder.feed(body.as_bytes()),
            vec![
                frame(None, r#"{"link":"a","status":"success"}"#),
                frame(Some("complete"), r#"{"message": "Task completed"}"#),
            ]
        );
    }

    #[test]
    fn handles_split_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: err").is_empty());
        assert!(decoder.feed(b"or\r\ndata:one\r\nda").is_empty());
        assert_eq!(
            decoder.feed(b"ta: two\r\n\r\n"),
            vec![frame(Some("error"), "one\ntwo")]
        );
    }

    #[test]
    fn keeps_multibyte_characters_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: é\n\n".as_bytes();
        assert!(decoder.feed(&bytes[..7]).is_empty());
        assert_eq!(decoder.feed(&bytes[7..]), vec![frame(None, "é")]);
    }

    #[test]
    fn maps_event_names() {
        assert_eq!(
            frame(None, "x").into_stream_event(),
            Some(StreamEvent::Message("x".into()))
        );
        assert_eq!(
            frame(Some("message"), "y").into_stream_event(),
            Some(StreamEvent::Message("y".into()))
        );
        assert_eq!(
            frame(Some("complete"), "").into_stream_event(),
            Some(StreamEvent::Complete)
        );
        assert_eq!(
            frame(Some("error"), "").into_stream_event(),
            Some(StreamEvent::Error(None))
        );
        assert_eq!(frame(Some("ping"), "").into_stream_event(), None);
    }

    #[test]
    fn blank_lines_without_fields_dispatch_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"\n\n: keepalive\n\n").is_empty());
    }
}
