//! Chat Completion API
//!
//! Request and response types for the `chat/completions` endpoint, and the
//! builder that validates a request before it leaves the process.

use crate::error::Result;
use crate::models::ModelAllowList;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default completion length
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Author of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation
    System,
    /// The human side of the conversation
    #[default]
    User,
    /// Replies produced by the model
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a chat conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub role: Role,

    /// Message text (`null` on the wire reads as empty)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    /// Chain-of-thought text returned by reasoning models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            reasoning_content: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Output format requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text
    Text,
    /// A single JSON object
    JsonObject,
}

/// Extra options that only apply to streamed requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Ask for a final chunk carrying token usage
    pub include_usage: bool,
}

/// Chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "deepseek-chat")
    pub model: String,

    /// Conversation history, oldest first
    pub messages: Vec<Message>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whether to stream the response as SSE chunks
    #[serde(default)]
    pub stream: bool,

    /// Output format constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,

    /// Streaming options, only sent with `stream: true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl ChatRequest {
    /// Start building a request for `model`
    pub fn builder(model: impl Into<String>) -> ChatRequestBuilder {
        ChatRequestBuilder::new(model)
    }
}

/// Builder for [`ChatRequest`]; validation happens in [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct ChatRequestBuilder {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    include_usage: bool,
    response_format: Option<ResponseFormat>,
}

impl ChatRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
            include_usage: false,
            response_format: None,
        }
    }

    /// Replace the conversation history
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages = messages.into_iter().collect();
        self
    }

    /// Append one message to the history
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Request a trailing usage chunk (ignored unless streaming)
    pub fn include_usage(mut self, include_usage: bool) -> Self {
        self.include_usage = include_usage;
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Validate the model and produce the wire request
    pub fn build(self, allowed_models: &ModelAllowList) -> Result<ChatRequest> {
        allowed_models.validate(&self.model)?;

        let stream_options = (self.stream && self.include_usage).then_some(StreamOptions {
            include_usage: true,
        });

        Ok(ChatRequest {
            model: self.model,
            messages: self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: self.stream,
            response_format: self.response_format,
            stream_options,
        })
    }
}

/// Chat completion response, or one chunk of a streamed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Completion ID, shared by all chunks of one stream
    pub id: String,

    /// Object type ("chat.completion" or "chat.completion.chunk")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    /// Creation timestamp (unix seconds)
    #[serde(default)]
    pub created: i64,

    /// Model that produced the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Generated choices
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token usage (single-shot responses, or the last chunk of a stream)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Content of the first choice's full message
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.as_str())
    }

    /// Content fragment of the first choice's delta
    pub fn delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.as_deref())
    }

    /// [`created`](Self::created) as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }
}

/// A choice in the completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position of this choice
    #[serde(default)]
    pub index: u32,

    /// Full message (single-shot responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Incremental fragment (streamed responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,

    /// Why generation stopped ("stop", "length", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Partial message carried by a streamed chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Usually only present in the first chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Text fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reasoning fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,

    /// Prompt tokens served from the context cache
    #[serde(default)]
    pub prompt_cache_hit_tokens: u32,

    /// Prompt tokens not found in the context cache
    #[serde(default)]
    pub prompt_cache_miss_tokens: u32,

    /// Breakdown of prompt tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens_details: Option<PromptTokensDetails>,

    /// Breakdown of completion tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

/// Prompt token breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTokensDetails {
    /// Tokens served from cache
    #[serde(default)]
    pub cached_tokens: u32,
}

/// Completion token breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTokensDetails {
    /// Tokens spent on reasoning
    #[serde(default)]
    pub reasoning_tokens: u32,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
