//! Plain-text rendering of transcripts, tool steps and session lists.

use flow_api::{ChatMessage, ChatRole, ContentBlock, ContentItem, SessionSummary};
use serde_json::Value;
use time::macros::format_description;
use time::OffsetDateTime;

const TOOL_VALUE_CHARS: usize = 120;

/// What to write so the terminal shows `current`, given `printed` is already
/// on screen. Growing text prints only the new suffix; any other change starts
/// a fresh line with the whole text.
#[must_use]
pub fn next_output(printed: &str, current: &str) -> Option<String> {
    if current == printed || current.is_empty() {
        return None;
    }
    match current.strip_prefix(printed) {
        Some(suffix) => Some(suffix.to_owned()),
        None => Some(format!("\n{current}")),
    }
}

/// `YYYY-MM-DD HH:MM` in UTC, or the raw number when out of range.
#[must_use]
pub fn format_timestamp(timestamp_ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp_ms) * 1_000_000)
        .ok()
        .and_then(|datetime| datetime.format(format).ok())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

#[must_use]
pub fn session_line(session: &SessionSummary) -> String {
    format!(
        "{}  {}  {}",
        format_timestamp(session.timestamp_ms),
        session.session_id,
        session.title
    )
}

/// One line per block title and per `tool_use` item.
#[must_use]
pub fn tool_step_lines(blocks: &[ContentBlock]) -> Vec<String> {
    let mut lines = Vec::new();
    for block in blocks {
        let title = if block.title.is_empty() { "Steps" } else { &block.title };
        lines.push(format!("[{title}]"));
        for item in &block.contents {
            if let ContentItem::ToolUse(tool) = item {
                lines.push(format!(
                    "  {}({}) -> {}",
                    tool.name,
                    compact_value(&tool.tool_input),
                    compact_value(&tool.output)
                ));
            }
        }
    }
    lines
}

#[must_use]
pub fn message_lines(message: &ChatMessage, ai_name: &str) -> Vec<String> {
    let speaker = match message.role {
        ChatRole::User => "You",
        ChatRole::Assistant => ai_name,
    };
    let mut lines = vec![format!(
        "{speaker} ({}):",
        format_timestamp(message.timestamp_ms)
    )];
    if let Some(blocks) = &message.content_blocks {
        lines.extend(tool_step_lines(blocks));
    }
    lines.extend(message.content.lines().map(|line| format!("  {line}")));
    lines
}

fn compact_value(value: &Value) -> String {
    let rendered = match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() <= TOOL_VALUE_CHARS {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(TOOL_VALUE_CHARS).collect();
    truncated.push('…');
    truncated
}
