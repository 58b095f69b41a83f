use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Content item type carrying a tool invocation trace.
pub const TOOL_USE_TYPE: &str = "tool_use";

/// One tool call observed in an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub input: Value,
    pub output: Value,
}

/// Structured group of items attached to an assistant turn ("agent steps").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub contents: Vec<ContentItem>,
    /// Fields this crate does not interpret, kept for round-tripping.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentBlock {
    pub fn new(title: impl Into<String>, contents: Vec<ContentItem>) -> Self {
        Self {
            title: title.into(),
            contents,
            extra: Map::new(),
        }
    }

    /// Parse one block, tolerating missing or mistyped fields.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn tool_invocations(&self) -> impl Iterator<Item = ToolInvocation> + '_ {
        self.contents.iter().filter_map(|item| match item {
            ContentItem::ToolUse(tool) => Some(tool.to_invocation()),
            ContentItem::Other(_) => None,
        })
    }
}

/// Item inside a [`ContentBlock`]. Only `tool_use` is interpreted; every other
/// item is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    ToolUse(ToolUse),
    Other(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolUseTag {
    #[serde(rename = "tool_use")]
    ToolUse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    #[serde(rename = "type")]
    pub kind: ToolUseTag,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub output: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolUse {
    pub fn from_invocation(tool: &ToolInvocation) -> Self {
        Self {
            kind: ToolUseTag::ToolUse,
            name: tool.name.clone(),
            tool_input: tool.input.clone(),
            output: tool.output.clone(),
            extra: Map::new(),
        }
    }

    pub fn to_invocation(&self) -> ToolInvocation {
        ToolInvocation {
            name: self.name.clone(),
            input: self.tool_input.clone(),
            output: self.output.clone(),
        }
    }
}

/// Normalized unit delivered to the per-chunk callback.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Payload that was not JSON (or a whole answer delivered at once).
    Raw(String),
    /// Text, tool traces and content blocks extracted from one frame.
    Structured {
        text: Option<String>,
        /// `true` when `text` supersedes everything emitted so far this turn.
        replace: bool,
        tools: Vec<ToolInvocation>,
        content_blocks: Vec<ContentBlock>,
    },
}

impl StreamChunk {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Structured { text, .. } => text.as_deref(),
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Structured { replace: true, .. })
    }

    pub fn tools(&self) -> &[ToolInvocation] {
        match self {
            Self::Raw(_) => &[],
            Self::Structured { tools, .. } => tools,
        }
    }

    pub fn content_blocks(&self) -> &[ContentBlock] {
        match self {
            Self::Raw(_) => &[],
            Self::Structured { content_blocks, .. } => content_blocks,
        }
    }
}

/// Authoritative terminal value of one send.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinalResult {
    pub text: String,
    pub content_blocks: Option<Vec<ContentBlock>>,
    pub raw: Value,
}

impl FinalResult {
    /// Result returned by the streaming readers, whose state lives entirely
    /// in the emitted chunks.
    pub fn stream_end() -> Self {
        Self::default()
    }

    pub fn has_blocks(&self) -> bool {
        self.content_blocks
            .as_ref()
            .is_some_and(|blocks| !blocks.is_empty())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => value,
        _ => String::new(),
    })
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<ContentItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item.clone()).unwrap_or(ContentItem::Other(item)))
        .collect())
}
