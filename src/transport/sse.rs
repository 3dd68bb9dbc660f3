//! Incremental parser for the SSE wire protocol.
//!
//! Frame boundaries are inferred from the arrival of a new `event` or `data`
//! field after a complete frame, NOT from blank-line separators. The upstream
//! service omits blank lines between events, so the strict WHATWG delimiting
//! rules do not apply here; this divergence is load-bearing and must be kept.

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tracing::trace;

use crate::error::{Error, Result};

/// One complete server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Payload. Multiple `data` lines in one frame are joined with `\n` in
    /// arrival order. An empty `data:` line is `Some("")`, not absent.
    pub data: Option<String>,
    /// Event name.
    pub event: Option<String>,
    /// Event id.
    pub id: Option<String>,
    /// Reconnection hint in milliseconds.
    pub retry_millis: Option<u64>,
}

impl SseFrame {
    fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.event.is_none()
            && self.id.is_none()
            && self.retry_millis.is_none()
    }
}

/// Incremental SSE parser.
///
/// Feed lines in arrival order; completed frames fall out of [`feed`] and a
/// final [`flush`] after stream end emits any pending unterminated frame.
/// One parser serves one connection; accumulation state dies with it.
///
/// [`feed`]: FrameParser::feed
/// [`flush`]: FrameParser::flush
#[derive(Debug, Default)]
pub struct FrameParser {
    pending: SseFrame,
}

impl FrameParser {
    /// Create a parser with no accumulated state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line; returns a frame when the line completes one.
    ///
    /// Lines must arrive without their terminator. Only the first `:` splits
    /// a line, so colons inside a value survive verbatim; at most one leading
    /// space is stripped from the value; a line with no `:` is a field name
    /// with an empty value.
    pub fn feed(&mut self, line: &str) -> Option<SseFrame> {
        if line.starts_with(':') {
            // Comment line; no state change.
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, rest)) => (field, rest.strip_prefix(' ').unwrap_or(rest)),
            None => (line, ""),
        };

        match field {
            "event" => {
                // A new event name after a complete frame closes that frame.
                let finished = self.pending.data.is_some().then(|| self.take_pending());
                self.pending.event = Some(value.to_string());
                finished
            }
            "data" => {
                if self.pending.data.is_some() && self.pending.event.is_some() {
                    // Both set: this data line starts the next frame.
                    let finished = self.take_pending();
                    self.pending.data = Some(value.to_string());
                    Some(finished)
                } else if let Some(data) = self.pending.data.as_mut() {
                    data.push('\n');
                    data.push_str(value);
                    None
                } else {
                    self.pending.data = Some(value.to_string());
                    None
                }
            }
            "id" => {
                self.pending.id = Some(value.to_string());
                None
            }
            "retry" => {
                match value.parse::<u64>() {
                    Ok(millis) => self.pending.retry_millis = Some(millis),
                    Err(_) => trace!(value, "non-numeric retry field ignored"),
                }
                None
            }
            // Unknown field names are ignored; this also covers blank lines,
            // which parse as an empty field name.
            _ => None,
        }
    }

    /// Emit whatever is accumulated at end of stream.
    ///
    /// Emits nothing when no field is pending, so a flush after a clean
    /// frame boundary is a no-op.
    pub fn flush(&mut self) -> Option<SseFrame> {
        (!self.pending.is_empty()).then(|| self.take_pending())
    }

    fn take_pending(&mut self) -> SseFrame {
        std::mem::take(&mut self.pending)
    }
}

/// Adapt a streaming HTTP response body into a stream of SSE frames.
///
/// Chunks are accumulated, split into lines on `\n` with a trailing `\r`
/// trimmed, and fed to a [`FrameParser`]. An unterminated trailing line is
/// fed at end of stream, followed by the final flush. A mid-stream transport
/// failure terminates the stream with [`Error::Stream`].
pub fn frame_stream(response: reqwest::Response) -> impl Stream<Item = Result<SseFrame>> + Send {
    try_stream! {
        let mut parser = FrameParser::new();
        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(|e| Error::Stream(format!("stream read failed: {}", e)))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let mut line: String = buffer.drain(..=newline).collect();
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
                if let Some(frame) = parser.feed(&line) {
                    yield frame;
                }
            }
        }

        if !buffer.is_empty() {
            if let Some(frame) = parser.feed(buffer.trim_end_matches('\r')) {
                yield frame;
            }
        }
        if let Some(frame) = parser.flush() {
            yield frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run lines through a fresh parser; collect frames including the flush.
    fn parse_all(lines: &[&str]) -> Vec<SseFrame> {
        let mut parser = FrameParser::new();
        let mut frames: Vec<SseFrame> = lines
            .iter()
            .copied()
            .filter_map(|line| parser.feed(line))
            .collect();
        frames.extend(parser.flush());
        frames
    }

    #[test]
    fn test_multi_line_data_joined_in_order() {
        let frames = parse_all(&["data: one", "data: two", "data: three"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_deref(), Some("one\ntwo\nthree"));
    }

    #[test]
    fn test_empty_data_is_empty_string_not_absent() {
        let frames = parse_all(&["data:"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_deref(), Some(""));
    }

    #[test]
    fn test_comment_alone_yields_no_frame() {
        let frames = parse_all(&[": keep-alive"]);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_colons_in_value_preserved() {
        let frames = parse_all(&["data: time: 12:30:45"]);
        assert_eq!(frames[0].data.as_deref(), Some("time: 12:30:45"));
    }

    #[test]
    fn test_single_leading_space_stripped_only() {
        let frames = parse_all(&["data:  two spaces"]);
        assert_eq!(frames[0].data.as_deref(), Some(" two spaces"));
    }

    #[test]
    fn test_non_numeric_retry_keeps_rest_of_frame() {
        let frames = parse_all(&["retry: not-a-number", "data: still here"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].retry_millis, None);
        assert_eq!(frames[0].data.as_deref(), Some("still here"));
    }

    #[test]
    fn test_numeric_retry_tracked() {
        let frames = parse_all(&["retry: 3000", "data: x"]);
        assert_eq!(frames[0].retry_millis, Some(3000));
    }

    #[test]
    fn test_new_event_closes_previous_frame() {
        let frames = parse_all(&[
            "event: progress",
            "data: {\"p\":0.1}",
            "event: progress",
            "data: {\"p\":0.5}",
        ]);
        assert_eq!(frames.len(), 2);
        for frame in &frames {
            assert_eq!(frame.event.as_deref(), Some("progress"));
        }
        assert_eq!(frames[0].data.as_deref(), Some("{\"p\":0.1}"));
        assert_eq!(frames[1].data.as_deref(), Some("{\"p\":0.5}"));
    }

    #[test]
    fn test_new_data_after_complete_frame_starts_next() {
        let frames = parse_all(&["event: tick", "data: a", "data: b"]);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event.as_deref(), Some("tick"));
        assert_eq!(frames[0].data.as_deref(), Some("a"));
        // The second frame has no event name of its own.
        assert_eq!(frames[1].event, None);
        assert_eq!(frames[1].data.as_deref(), Some("b"));
    }

    #[test]
    fn test_event_without_data_overwritten() {
        let frames = parse_all(&["event: first", "event: second", "data: x"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("second"));
    }

    #[test]
    fn test_id_carried_on_emitted_frame() {
        let frames = parse_all(&["id: 42", "data: payload"]);
        assert_eq!(frames[0].id.as_deref(), Some("42"));
    }

    #[test]
    fn test_emission_consumes_accumulated_id() {
        let frames = parse_all(&[
            "id: 1",
            "event: tick",
            "data: a",
            "event: tick",
            "data: b",
        ]);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].id.as_deref(), Some("1"));
        assert_eq!(frames[1].id, None);
    }

    #[test]
    fn test_flush_on_empty_parser_emits_nothing() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.flush(), None);
        assert_eq!(parser.flush(), None);
    }

    #[test]
    fn test_flush_after_clean_boundary_is_noop() {
        let mut parser = FrameParser::new();
        parser.feed("event: tick");
        parser.feed("data: a");
        assert!(parser.feed("event: tock").is_some());
        // "tock" is now pending with no data; flush emits it once.
        assert!(parser.flush().is_some());
        assert_eq!(parser.flush(), None);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let frames = parse_all(&["custom: ignored", "data: kept"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_deref(), Some("kept"));
    }

    #[test]
    fn test_blank_line_is_not_a_boundary() {
        let frames = parse_all(&["data: a", "", "data: b"]);
        // No event name is set, so the blank line changes nothing and the
        // two data lines concatenate.
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_deref(), Some("a\nb"));
    }

    #[test]
    fn test_line_with_no_colon_is_field_with_empty_value() {
        let frames = parse_all(&["data"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.as_deref(), Some(""));
    }

    #[test]
    fn test_id_only_input_flushes_one_frame() {
        let frames = parse_all(&["id: lonely"]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id.as_deref(), Some("lonely"));
        assert_eq!(frames[0].data, None);
    }
}
