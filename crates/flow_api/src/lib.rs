//! Client-side protocol handling for a remote flow-execution endpoint.
//!
//! The crate owns request building, adaptive response reading (SSE,
//! newline-delimited JSON, or a single JSON document) and the reduction of
//! streamed frames into [`StreamChunk`] values and one [`FinalResult`] per
//! send. It also wraps the monitor/history endpoint used to list, replay and
//! delete chat sessions.
//!
//! Settings are an explicit [`FlowSettings`] value owned by each
//! [`FlowApiClient`]; persistence lives outside this crate.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod headers;
pub mod history;
pub mod ndjson;
pub mod payload;
pub mod response;
pub mod sniff;
pub mod sse;
pub mod transcript;
pub mod transport;
pub mod url;
pub mod utf8;

pub use client::{ConnectionCheck, FlowApiClient};
pub use config::{FlowSettings, SettingsUpdate};
pub use error::FlowApiError;
pub use events::{ContentBlock, ContentItem, FinalResult, StreamChunk, ToolInvocation, ToolUse};
pub use history::{
    build_content_blocks_from_tools, new_session_id, ChatMessage, ChatRole, DeleteOutcome,
    HistoryPair, HistoryQuery, SessionSummary,
};
pub use ndjson::NdjsonStreamParser;
pub use response::parse_response;
pub use sniff::looks_like_html;
pub use sse::SseStreamParser;
pub use transcript::AssistantTurn;
pub use transport::{choose_reader, ReaderKind};
