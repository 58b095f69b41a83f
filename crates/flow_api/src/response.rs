use serde_json::Value;

use crate::events::{ContentBlock, FinalResult};
use crate::frame::{blocks_in, non_empty_str};

/// Reduce a complete (non-streaming) run response to its answer.
///
/// Never fails: unrecognised documents are rendered as a fenced JSON block so
/// the caller always has something to display.
pub fn parse_response(document: &Value) -> FinalResult {
    if let Some(result) = flow_output_result(document) {
        return result;
    }

    for field in ["result", "message", "text"] {
        if let Some(text) = non_empty_str(document.get(field)) {
            return FinalResult {
                text: text.to_owned(),
                content_blocks: None,
                raw: document.clone(),
            };
        }
    }

    match serde_json::to_string_pretty(document) {
        Ok(rendered) => FinalResult {
            text: format!("```json\n{rendered}\n```"),
            content_blocks: None,
            raw: document.clone(),
        },
        Err(error) => FinalResult {
            text: format!("**Could not read the server response**\n\n```text\n{error}\n```"),
            content_blocks: None,
            raw: Value::Null,
        },
    }
}

fn flow_output_result(document: &Value) -> Option<FinalResult> {
    let output = document.get("outputs")?.get(0)?;

    if let Some(first) = output.get("outputs").and_then(|outputs| outputs.get(0)) {
        if let Some(message) = first.get("results").and_then(|results| results.get("message")) {
            let text = non_empty_str(message.get("text"))
                .or_else(|| non_empty_str(message.pointer("/data/text")))
                .or_else(|| non_empty_str(Some(message)));
            if let Some(text) = text {
                return Some(FinalResult {
                    text: text.to_owned(),
                    content_blocks: message_blocks(message),
                    raw: message.clone(),
                });
            }
        }

        if let Some(artifacts) = first.get("artifacts") {
            if let Some(text) = non_empty_str(artifacts.get("message")) {
                return Some(FinalResult {
                    text: text.to_owned(),
                    content_blocks: None,
                    raw: artifacts.clone(),
                });
            }
        }

        if let Some(text) = non_empty_str(first.get("text")) {
            return Some(FinalResult {
                text: text.to_owned(),
                content_blocks: None,
                raw: first.clone(),
            });
        }
    }

    let text = non_empty_str(output.get("text")).or_else(|| non_empty_str(output.get("message")))?;
    Some(FinalResult {
        text: text.to_owned(),
        content_blocks: None,
        raw: output.clone(),
    })
}

/// Blocks from `message.data.content_blocks`, falling back to
/// `message.content_blocks`.
fn message_blocks(message: &Value) -> Option<Vec<ContentBlock>> {
    let nested = blocks_in(message.get("data"));
    if !nested.is_empty() {
        return Some(nested);
    }
    let direct = blocks_in(Some(message));
    if !direct.is_empty() {
        return Some(direct);
    }
    None
}

