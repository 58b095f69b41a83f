//! Monitor endpoint access: raw history records, user/assistant pairing,
//! session summaries and deletion.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, warn};

use crate::client::{content_type, ensure_success, FlowApiClient};
use crate::error::FlowApiError;
use crate::events::{ContentBlock, ContentItem, ToolInvocation, ToolUse};
use crate::frame::{blocks_in, tools_in_blocks};
use crate::headers::RequestKind;
use crate::url::{messages_url, session_url};

/// Title of the block synthesized from a bare tool list.
pub const AGENT_STEPS_TITLE: &str = "Agent Steps";
pub const DEFAULT_SESSION_TITLE: &str = "Chat";
pub const DEFAULT_SESSION_LIMIT: usize = 50;

const TITLE_CHARS: usize = 24;
const PREVIEW_CHARS: usize = 80;
/// Numeric timestamps above this are already milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

const USER_SENDER: &str = "User";
const ASSISTANT_SENDERS: [&str; 2] = ["Machine", "AI"];

/// Which history records to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    /// Fetch every session, ignoring `session_id`.
    pub all: bool,
}

impl HistoryQuery {
    pub fn all() -> Self {
        Self {
            session_id: None,
            all: true,
        }
    }

    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            all: false,
        }
    }
}

/// One user prompt and the assistant answer that followed it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPair {
    pub input: String,
    pub output: String,
    pub session_id: String,
    pub timestamp_ms: Option<i64>,
    pub tools: Vec<ToolInvocation>,
    pub content_blocks: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    pub preview: String,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A replayable transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_blocks: Option<Vec<ContentBlock>>,
}

/// Result of [`FlowApiClient::delete_session`]. Failures are reported here
/// rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub success: bool,
    /// HTTP status, or `0` when no response was received.
    pub status: u16,
    pub message: Option<String>,
}

impl DeleteOutcome {
    fn failed(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: Some(message.into()),
        }
    }
}

impl FlowApiClient {
    /// Fetch raw history and pair it into prompt/answer turns.
    pub async fn get_messages(&self, query: &HistoryQuery) -> Result<Vec<HistoryPair>, FlowApiError> {
        let session_id = (!query.all).then(|| query.session_id.as_deref().unwrap_or(""));
        let url = messages_url(self.settings(), session_id)?;
        debug!(%url, "fetching history");

        let response = self
            .http()
            .get(url)
            .headers(self.headers(RequestKind::History)?)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        if !content_type(&response).contains("application/json") {
            let body = response.text().await.unwrap_or_default();
            return Err(FlowApiError::unexpected_body(&body));
        }

        let records: Value = response.json().await?;
        Ok(pair_records(&records))
    }

    /// Most recent sessions first, at most `limit` of them.
    pub async fn list_sessions(&self, limit: usize) -> Result<Vec<SessionSummary>, FlowApiError> {
        let pairs = self.get_messages(&HistoryQuery::all()).await?;
        Ok(summarize_sessions(&pairs, limit, now_ms()))
    }

    /// Replay one session as alternating user and assistant messages.
    pub async fn get_session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, FlowApiError> {
        let pairs = self.get_messages(&HistoryQuery::session(session_id)).await?;
        Ok(flatten_pairs(&pairs, now_ms()))
    }

    /// Delete every message of a session. Never fails; see [`DeleteOutcome`].
    pub async fn delete_session(&self, session_id: &str) -> DeleteOutcome {
        if session_id.trim().is_empty() {
            return DeleteOutcome::failed(0, "a session id is required");
        }

        let request = match session_url(self.settings(), session_id)
            .and_then(|url| Ok(self.http().delete(url).headers(self.headers(RequestKind::Delete)?)))
        {
            Ok(request) => request,
            Err(error) => return DeleteOutcome::failed(0, error.user_message()),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, session_id, "delete request failed");
                return DeleteOutcome::failed(0, FlowApiError::from(error).user_message());
            }
        };

        let status = response.status().as_u16();
        match ensure_success(response).await {
            Ok(_) => DeleteOutcome {
                success: true,
                status,
                message: None,
            },
            Err(error) => DeleteOutcome::failed(status, error.to_string()),
        }
    }
}

/// Pair records two at a time: a `User` record followed by a `Machine`/`AI`
/// record. Pairs that do not match are dropped, not realigned, and a trailing
/// unpaired record is ignored.
pub fn pair_records(records: &Value) -> Vec<HistoryPair> {
    let Some(records) = records.as_array() else {
        warn!("history response is not an array");
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for (index, pair) in records.chunks_exact(2).enumerate() {
        let (user, assistant) = (&pair[0], &pair[1]);
        if !is_user(user) || !is_assistant(assistant) {
            warn!(position = index * 2, "skipping misaligned history records");
            continue;
        }

        let blocks = blocks_in(Some(assistant));
        let tools = tools_in_blocks(&blocks);
        pairs.push(HistoryPair {
            input: string_field(user, "text"),
            output: string_field(assistant, "text"),
            session_id: session_of(user)
                .or_else(|| session_of(assistant))
                .unwrap_or_default()
                .to_owned(),
            timestamp_ms: pair_timestamp(user, assistant),
            tools,
            content_blocks: (!blocks.is_empty()).then_some(blocks),
        });
    }
    pairs
}

/// Group pairs by session, keep the newest pair of each, newest session first.
/// Pairs without a timestamp count as `now_ms`; on equal timestamps the later
/// pair wins.
pub fn summarize_sessions(pairs: &[HistoryPair], limit: usize, now_ms: i64) -> Vec<SessionSummary> {
    let mut sessions: Vec<SessionSummary> = Vec::new();
    let mut index_by_id: HashMap<&str, usize> = HashMap::new();

    for pair in pairs {
        if pair.session_id.is_empty() {
            continue;
        }
        let timestamp_ms = pair.timestamp_ms.unwrap_or(now_ms);
        let text = if pair.input.is_empty() { &pair.output } else { &pair.input };
        let title: String = text.chars().take(TITLE_CHARS).collect();
        let summary = SessionSummary {
            session_id: pair.session_id.clone(),
            title: if title.is_empty() {
                DEFAULT_SESSION_TITLE.to_owned()
            } else {
                title
            },
            preview: text.chars().take(PREVIEW_CHARS).collect(),
            timestamp_ms,
        };

        match index_by_id.get(pair.session_id.as_str()) {
            Some(&slot) if sessions[slot].timestamp_ms <= timestamp_ms => sessions[slot] = summary,
            Some(_) => {}
            None => {
                index_by_id.insert(&pair.session_id, sessions.len());
                sessions.push(summary);
            }
        }
    }

    sessions.sort_by(|left, right| right.timestamp_ms.cmp(&left.timestamp_ms));
    sessions.truncate(limit);
    sessions
}

/// Expand pairs into messages. Assistant messages carry the pair's blocks,
/// or blocks rebuilt from its tool list.
pub fn flatten_pairs(pairs: &[HistoryPair], now_ms: i64) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    for pair in pairs {
        let timestamp_ms = pair.timestamp_ms.unwrap_or(now_ms);
        if !pair.input.is_empty() {
            messages.push(ChatMessage {
                id: messages.len() as u64 + 1,
                role: ChatRole::User,
                content: pair.input.clone(),
                timestamp_ms,
                content_blocks: None,
            });
        }
        if !pair.output.is_empty() {
            let content_blocks = pair
                .content_blocks
                .clone()
                .filter(|blocks| !blocks.is_empty())
                .or_else(|| build_content_blocks_from_tools(&pair.tools));
            messages.push(ChatMessage {
                id: messages.len() as u64 + 1,
                role: ChatRole::Assistant,
                content: pair.output.clone(),
                timestamp_ms,
                content_blocks,
            });
        }
    }
    messages
}

/// Wrap tool invocations in a single "Agent Steps" block. Inverse of the
/// `tool_use` extraction; `None` for an empty list.
pub fn build_content_blocks_from_tools(tools: &[ToolInvocation]) -> Option<Vec<ContentBlock>> {
    if tools.is_empty() {
        return None;
    }
    let contents = tools
        .iter()
        .map(|tool| ContentItem::ToolUse(ToolUse::from_invocation(tool)))
        .collect();
    Some(vec![ContentBlock::new(AGENT_STEPS_TITLE, contents)])
}

/// Identifier for a new chat: `chat_<epoch-ms>`.
pub fn new_session_id() -> String {
    format!("chat_{}", now_ms())
}

/// Milliseconds since the Unix epoch for an RFC 3339 string, a
/// `YYYY-MM-DD HH:MM:SS[.ffffff][ UTC]` string, or a number of seconds or
/// milliseconds.
pub fn parse_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_f64().map(epoch_number_to_ms),
        Value::String(text) => parse_timestamp_str(text.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(number) = text.parse::<f64>() {
        return Some(epoch_number_to_ms(number));
    }
    if let Ok(parsed) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(datetime_ms(parsed));
    }

    let naive = text
        .strip_suffix("UTC")
        .or_else(|| text.strip_suffix('Z'))
        .unwrap_or(text)
        .trim()
        .replacen('T', " ", 1);
    let with_fraction = format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
    let whole_seconds = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    PrimitiveDateTime::parse(&naive, with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(&naive, whole_seconds))
        .ok()
        .map(|parsed| datetime_ms(parsed.assume_utc()))
}

fn epoch_number_to_ms(number: f64) -> i64 {
    if number.abs() > MILLIS_THRESHOLD {
        number as i64
    } else {
        (number * 1000.0) as i64
    }
}

fn datetime_ms(datetime: OffsetDateTime) -> i64 {
    (datetime.unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn now_ms() -> i64 {
    datetime_ms(OffsetDateTime::now_utc())
}

/// First present of `ai.timestamp`, `user.timestamp`, `ai.created_at`,
/// `user.created_at`.
fn pair_timestamp(user: &Value, assistant: &Value) -> Option<i64> {
    [
        assistant.get("timestamp"),
        user.get("timestamp"),
        assistant.get("created_at"),
        user.get("created_at"),
    ]
    .into_iter()
    .flatten()
    .find(|value| is_present(value))
    .and_then(parse_timestamp_ms)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

fn sender(record: &Value) -> Option<&str> {
    record.get("sender").and_then(Value::as_str)
}

fn is_user(record: &Value) -> bool {
    sender(record) == Some(USER_SENDER)
}

fn is_assistant(record: &Value) -> bool {
    sender(record).is_some_and(|sender| ASSISTANT_SENDERS.contains(&sender))
}

fn string_field(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn session_of(record: &Value) -> Option<&str> {
    record
        .get("session_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}
