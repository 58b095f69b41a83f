use std::sync::OnceLock;

use regex::Regex;

use crate::events::StreamChunk;
use crate::frame::{classify_payload, FrameOutcome};
use crate::utf8::Utf8Decoder;

fn event_boundary_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"\r?\n\r?\n").expect("event boundary regex must compile")
    })
}

/// Incremental parser for `text/event-stream` bodies.
///
/// Events are separated by a blank line. The `data:` lines of an event form
/// its payload; an event without any `data:` line is used verbatim, which
/// tolerates servers that label newline-delimited JSON as an event stream.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: String,
    decoder: Utf8Decoder,
    done: bool,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    ///
    /// Once a termination frame (`[DONE]` or an `end` event) is seen, the
    /// rest of the buffer is discarded and further input is ignored.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamChunk> {
        if self.done {
            return Vec::new();
        }
        self.decoder.decode_into(bytes, &mut self.buffer);
        let mut chunks = Vec::new();

        while let Some((start, end)) = event_boundary_regex()
            .find(&self.buffer)
            .map(|boundary| (boundary.start(), boundary.end()))
        {
            let event = self.buffer[..start].to_string();
            self.buffer.drain(..end);

            match classify_payload(&event_payload(&event)) {
                FrameOutcome::Emit(chunk) => chunks.push(chunk),
                FrameOutcome::Skip => {}
                FrameOutcome::End => {
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
            }
        }

        chunks
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<StreamChunk> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    /// Whether a termination frame has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty() && !self.decoder.has_pending()
    }
}

fn event_payload(event: &str) -> String {
    let data_lines: Vec<&str> = event
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();

    if data_lines.is_empty() {
        event.trim().to_owned()
    } else {
        data_lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::{event_payload, SseStreamParser};

    #[test]
    fn parse_sse_frames_incrementally() {
        let mut parser = SseStreamParser::default();
        let mut chunks = Vec::new();

        chunks.extend(parser.feed(b"data: {\"token\":\"Hello\"}\n\n"));
        assert_eq!(chunks.len(), 1);

        chunks.extend(parser.feed(b"data: [DONE]\n\n"));
        assert_eq!(chunks.len(), 1);
        assert!(parser.is_done());
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn multi_line_data_is_joined_with_newlines() {
        assert_eq!(event_payload("data: a\ndata: b"), "a\nb");
        assert_eq!(event_payload("event: x\r\ndata:  {\"k\":1} "), "{\"k\":1}");
    }

    #[test]
    fn event_without_data_lines_falls_back_to_raw_text() {
        assert_eq!(event_payload("  {\"text\":\"x\"}  "), "{\"text\":\"x\"}");
    }
}
