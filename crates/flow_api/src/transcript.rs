use crate::events::{ContentBlock, FinalResult, StreamChunk};
use crate::history::{build_content_blocks_from_tools, now_ms, ChatMessage, ChatRole};

/// Assistant message being assembled from the chunks of one send.
///
/// Chunks whose text repeats the user's prompt are treated as an echo and
/// ignored. Raw chunks and `replace` chunks overwrite the text; other
/// structured text is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantTurn {
    prompt: String,
    text: String,
    content_blocks: Option<Vec<ContentBlock>>,
    typing: bool,
}

impl AssistantTurn {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            text: String::new(),
            content_blocks: None,
            typing: true,
        }
    }

    /// Fold one chunk in. Returns `false` when the chunk was an echo.
    pub fn apply(&mut self, chunk: &StreamChunk) -> bool {
        if chunk.text().is_some_and(|text| self.is_echo(text)) {
            return false;
        }

        match chunk {
            StreamChunk::Raw(text) => self.text.clone_from(text),
            StreamChunk::Structured {
                text: Some(text),
                replace: true,
                ..
            } => self.text.clone_from(text),
            StreamChunk::Structured {
                text: Some(text), ..
            } => self.text.push_str(text),
            StreamChunk::Structured { text: None, .. } => {}
        }

        if !chunk.content_blocks().is_empty() {
            self.content_blocks = Some(chunk.content_blocks().to_vec());
        } else if let Some(blocks) = build_content_blocks_from_tools(chunk.tools()) {
            self.content_blocks = Some(blocks);
        }

        if !self.text.is_empty() {
            self.typing = false;
        }
        true
    }

    /// Reconcile with the terminal result. Final text and blocks only win
    /// when they are non-empty, so streamed tool steps survive.
    pub fn finish(&mut self, result: &FinalResult) {
        if !result.text.is_empty() {
            self.text.clone_from(&result.text);
        }
        if let Some(blocks) = result.content_blocks.as_ref().filter(|blocks| !blocks.is_empty()) {
            self.content_blocks = Some(blocks.clone());
        }
        self.typing = false;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn content_blocks(&self) -> Option<&[ContentBlock]> {
        self.content_blocks.as_deref()
    }

    /// Still waiting for the first piece of text.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn into_message(self, id: u64) -> ChatMessage {
        ChatMessage {
            id,
            role: ChatRole::Assistant,
            content: self.text,
            timestamp_ms: now_ms(),
            content_blocks: self.content_blocks,
        }
    }

    fn is_echo(&self, text: &str) -> bool {
        text.trim() == self.prompt.trim()
    }
}
