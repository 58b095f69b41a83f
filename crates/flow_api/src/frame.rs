//! Extraction of text, tool traces and content blocks from one decoded frame.
//!
//! Every function here is total: an unrecognised shape yields an empty string
//! or an empty list, never an error.

use serde_json::Value;

use crate::events::{ContentBlock, StreamChunk, ToolInvocation};

/// Payload some servers send instead of an end event.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Event name of the explicit end-of-stream frame.
pub const END_EVENT: &str = "end";
/// Event names whose text is a full snapshot of the message so far.
pub const SNAPSHOT_EVENTS: [&str; 2] = ["add_message", "update_message"];

const FLAT_TEXT_FIELDS: [&str; 7] = [
    "token", "delta", "text", "content", "message", "data", "output",
];

/// `event` field of an event-envelope frame.
pub fn event_type(frame: &Value) -> Option<&str> {
    frame.get("event").and_then(Value::as_str)
}

pub fn is_end_event(frame: &Value) -> bool {
    event_type(frame) == Some(END_EVENT)
}

pub fn is_snapshot_event(frame: &Value) -> bool {
    event_type(frame).is_some_and(|event| SNAPSHOT_EVENTS.contains(&event))
}

/// Locate the answer text of a frame, trying the envelope, flat, chat-completion
/// and flow-output shapes in that order.
pub fn extract_text(frame: &Value) -> String {
    if !frame.is_object() {
        return String::new();
    }

    envelope_text(frame)
        .or_else(|| flat_text(frame))
        .or_else(|| chat_completion_text(frame))
        .or_else(|| flow_output_text(frame))
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

/// Content blocks carried by `data.content_blocks`.
pub fn extract_blocks(frame: &Value) -> Vec<ContentBlock> {
    blocks_in(frame.get("data"))
}

/// Tool invocations found in the `tool_use` items of the frame's blocks.
pub fn extract_tools(frame: &Value) -> Vec<ToolInvocation> {
    tools_in_blocks(&extract_blocks(frame))
}

/// Parse the `content_blocks` array of a message object, skipping entries that
/// are not block objects.
pub fn blocks_in(message: Option<&Value>) -> Vec<ContentBlock> {
    message
        .and_then(|message| message.get("content_blocks"))
        .and_then(Value::as_array)
        .map(|blocks| blocks.iter().filter_map(ContentBlock::from_value).collect())
        .unwrap_or_default()
}

pub fn tools_in_blocks(blocks: &[ContentBlock]) -> Vec<ToolInvocation> {
    blocks
        .iter()
        .flat_map(ContentBlock::tool_invocations)
        .collect()
}

/// What a stream reader does with one frame payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Emit(StreamChunk),
    Skip,
    End,
}

/// Classify one trimmed frame payload: termination sentinels end the stream,
/// JSON objects and arrays go through the extractors, anything else
/// (including bare JSON scalars such as `42`) is emitted raw.
pub fn classify_payload(payload: &str) -> FrameOutcome {
    if payload.is_empty() {
        return FrameOutcome::Skip;
    }
    if payload == DONE_SENTINEL {
        return FrameOutcome::End;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(frame) if !frame.is_object() && !frame.is_array() => {
            FrameOutcome::Emit(StreamChunk::Raw(payload.to_owned()))
        }
        Ok(frame) if is_end_event(&frame) => FrameOutcome::End,
        Ok(frame) => chunk_from_frame(&frame).map_or(FrameOutcome::Skip, FrameOutcome::Emit),
        Err(_) => FrameOutcome::Emit(StreamChunk::Raw(payload.to_owned())),
    }
}

/// Combine the text, tools and blocks of a frame into one chunk, or `None`
/// when the frame carries none of them.
pub fn chunk_from_frame(frame: &Value) -> Option<StreamChunk> {
    let text = extract_text(frame);
    let content_blocks = extract_blocks(frame);
    let tools = tools_in_blocks(&content_blocks);

    if text.is_empty() && tools.is_empty() && content_blocks.is_empty() {
        return None;
    }

    let replace = !text.is_empty() && is_snapshot_event(frame);
    Some(StreamChunk::Structured {
        text: (!text.is_empty()).then_some(text),
        replace,
        tools,
        content_blocks,
    })
}

fn envelope_text(frame: &Value) -> Option<&str> {
    event_type(frame)?;
    let data = frame.get("data").filter(|data| data.is_object())?;
    non_empty_str(data.get("text"))
}

fn flat_text(frame: &Value) -> Option<&str> {
    FLAT_TEXT_FIELDS
        .iter()
        .find_map(|field| non_empty_str(frame.get(*field)))
}

fn chat_completion_text(frame: &Value) -> Option<&str> {
    let choice = frame.get("choices")?.get(0)?;
    non_empty_str(choice.get("delta").and_then(|delta| delta.get("content")))
        .or_else(|| non_empty_str(choice.get("text")))
}

fn flow_output_text(frame: &Value) -> Option<&str> {
    let output = frame.get("outputs")?.get(0)?;

    if let Some(first) = output.get("outputs").and_then(|outputs| outputs.get(0)) {
        if let Some(message) = first.get("results").and_then(|results| results.get("message")) {
            let candidate = non_empty_str(message.get("text"))
                .or_else(|| non_empty_str(message.pointer("/data/text")))
                .or_else(|| non_empty_str(message.pointer("/data/content")))
                .or_else(|| non_empty_str(message.get("content")))
                .or_else(|| non_empty_str(Some(message)));
            if candidate.is_some() {
                return candidate;
            }
        }
        if let Some(text) = non_empty_str(first.pointer("/artifacts/message"))
            .or_else(|| non_empty_str(first.get("text")))
        {
            return Some(text);
        }
    }

    non_empty_str(output.get("text")).or_else(|| non_empty_str(output.get("message")))
}

/// String value that is not empty. Whitespace counts as text so streamed
/// newline and space tokens survive.
pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
