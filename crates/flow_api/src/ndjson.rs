use crate::error::FlowApiError;
use crate::events::StreamChunk;
use crate::frame::{classify_payload, FrameOutcome};
use crate::sniff::looks_like_html;
use crate::utf8::Utf8Decoder;

/// Incremental parser for newline-delimited bodies.
///
/// Each non-empty line (optionally prefixed with `data:`) is one frame. Lines
/// that are not JSON are emitted as raw text unless they look like an HTML
/// page, in which case the stream fails with [`FlowApiError::Connection`].
#[derive(Debug, Default)]
pub struct NdjsonStreamParser {
    buffer: String,
    decoder: Utf8Decoder,
    done: bool,
}

impl NdjsonStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete lines.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<StreamChunk>, FlowApiError> {
        if self.done {
            return Ok(Vec::new());
        }
        self.decoder.decode_into(bytes, &mut self.buffer);
        let mut chunks = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line = self.buffer[..newline].to_string();
            self.buffer.drain(..=newline);

            if self.process_line(&line, &mut chunks)? {
                self.buffer.clear();
                break;
            }
        }

        Ok(chunks)
    }

    /// Flush whatever remains buffered after the body ended.
    ///
    /// Does nothing when a termination frame was already seen.
    pub fn finish(&mut self) -> Result<Vec<StreamChunk>, FlowApiError> {
        if self.done {
            return Ok(Vec::new());
        }
        self.decoder.finish(&mut self.buffer);
        let rest = std::mem::take(&mut self.buffer);
        let mut chunks = Vec::new();
        self.process_line(&rest, &mut chunks)?;
        Ok(chunks)
    }

    /// Parse a complete body in one shot, including the trailing remainder.
    pub fn parse_lines(input: &str) -> Result<Vec<StreamChunk>, FlowApiError> {
        let mut parser = Self::default();
        let mut chunks = parser.feed(input.as_bytes())?;
        chunks.extend(parser.finish()?);
        Ok(chunks)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty() && !self.decoder.has_pending()
    }

    /// Returns `true` when the line terminated the stream.
    fn process_line(
        &mut self,
        line: &str,
        chunks: &mut Vec<StreamChunk>,
    ) -> Result<bool, FlowApiError> {
        let line = line.trim();
        let payload = line.strip_prefix("data:").map_or(line, str::trim);

        match classify_payload(payload) {
            FrameOutcome::Emit(StreamChunk::Raw(text)) if looks_like_html(&text) => {
                Err(FlowApiError::Connection)
            }
            FrameOutcome::Emit(chunk) => {
                chunks.push(chunk);
                Ok(false)
            }
            FrameOutcome::Skip => Ok(false),
            FrameOutcome::End => {
                self.done = true;
                Ok(true)
            }
        }
    }
}
