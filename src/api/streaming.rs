//! Streaming Support
//!
//! Classification of Server-Sent-Events lines and accumulation of streamed
//! chunks into a final message.

use crate::api::completion::{ChatResponse, Message, Role, Usage};
use crate::api::result::ServiceResult;
use futures::Stream;
use std::pin::Pin;

/// Prefix of every payload line
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Lazily decoded sequence of streamed chunks
pub type ChatStream<'a> = Pin<Box<dyn Stream<Item = ServiceResult<ChatResponse>> + Send + 'a>>;

/// What a single line of the event feed means
#[derive(Debug)]
pub enum SseLine {
    /// Blank line, comment, keep-alive or a non-data field
    Skip,

    /// `data: [DONE]`
    Done,

    /// A data line, decoded independently of every other line
    Chunk(Result<ChatResponse, serde_json::Error>),
}

/// Classify one line of the event feed
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.trim().is_empty() {
        return SseLine::Skip;
    }

    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        // event:, id:, retry:, ": keep-alive"
        return SseLine::Skip;
    };

    let data = data.trim();
    if data == DONE_SENTINEL {
        return SseLine::Done;
    }

    SseLine::Chunk(serde_json::from_str(data))
}

/// Folds streamed chunks into the final assistant message
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    /// Accumulated content
    pub content: String,

    /// Accumulated reasoning text (reasoning models only)
    pub reasoning_content: String,

    /// Role from first chunk
    pub role: Option<Role>,

    /// Finish reason from last chunk
    pub finish_reason: Option<String>,

    /// Response ID
    pub id: Option<String>,

    /// Created timestamp
    pub created: Option<i64>,

    /// Usage from final chunk
    pub usage: Option<Usage>,

    /// Number of chunks folded in
    pub chunks: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk; only the first choice contributes content
    pub fn process_chunk(&mut self, chunk: &ChatResponse) {
        self.chunks += 1;

        if self.id.is_none() {
            self.id = Some(chunk.id.clone());
            self.created = Some(chunk.created);
        }

        if chunk.usage.is_some() {
            self.usage = chunk.usage.clone();
        }

        let Some(choice) = chunk.choices.first() else {
            return;
        };

        if let Some(delta) = &choice.delta {
            if self.role.is_none() {
                self.role = delta.role;
            }
            if let Some(content) = &delta.content {
                self.content.push_str(content);
            }
            if let Some(reasoning) = &delta.reasoning_content {
                self.reasoning_content.push_str(reasoning);
            }
        }

        if let Some(reason) = &choice.finish_reason {
            self.finish_reason = Some(reason.clone());
        }
    }

    /// Fold a streamed item, ignoring failures. Returns the new content fragment.
    pub fn process_result<'a>(&mut self, result: &'a ServiceResult<ChatResponse>) -> Option<&'a str> {
        let chunk = result.data()?;
        self.process_chunk(chunk);
        chunk.delta_content()
    }

    /// Convert to a final Message
    pub fn into_message(self) -> Message {
        Message {
            role: self.role.unwrap_or(Role::Assistant),
            content: self.content,
            reasoning_content: (!self.reasoning_content.is_empty()).then_some(self.reasoning_content),
        }
    }
}
