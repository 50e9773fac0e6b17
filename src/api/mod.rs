//! API Module
//!
//! Chat completion types, request building, and response decoding.

pub mod completion;
pub mod decoder;
pub mod lines;
pub mod result;
pub mod streaming;

pub use completion::{
    ChatRequest, ChatRequestBuilder, ChatResponse, Choice, CompletionTokensDetails, Delta,
    Message, PromptTokensDetails, ResponseFormat, Role, StreamOptions, Usage,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
pub use decoder::{decode_error, decode_stream, decode_whole, read_body};
pub use lines::LineStream;
pub use result::{codes, ErrorInfo, ServiceResult};
pub use streaming::{parse_sse_line, ChatStream, SseLine, StreamAccumulator};
