//! DeepSeek Client
//!
//! An async client for the DeepSeek chat-completion API. Requests are
//! validated against a model allow-list before they are sent; responses are
//! decoded either whole or as a lazily consumed stream of chunks, and every
//! failure is reported as a [`ServiceResult::Failure`] value.
//!
//! ```no_run
//! use deepseek_client::{ChatRequest, DeepSeekClient, Message};
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> deepseek_client::Result<()> {
//! let client = DeepSeekClient::from_env()?;
//! let request = ChatRequest::builder("deepseek-chat")
//!     .message(Message::user("Hello"))
//!     .stream(true)
//!     .build(client.allowed_models())?;
//!
//! let mut chunks = client.chat_stream(request, CancellationToken::new())?;
//! while let Some(chunk) = chunks.next().await {
//!     if let Some(text) = chunk.data().and_then(|c| c.delta_content()) {
//!         print!("{}", text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;

pub use api::{
    ChatRequest, ChatRequestBuilder, ChatResponse, ChatStream, Choice, Delta, ErrorInfo, Message,
    ResponseFormat, Role, ServiceResult, StreamAccumulator, Usage,
};
pub use client::{HttpClient, Transport, TransportResponse};
pub use config::ClientConfig;
pub use error::{DeepSeekError, Result};
pub use models::{DeepSeekModel, ModelAllowList};

/// Path of the chat completion endpoint, relative to the base URL
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// The main DeepSeek client
pub struct DeepSeekClient<T = HttpClient> {
    /// Sends requests
    transport: T,

    /// Models accepted by pre-flight validation
    allowed_models: ModelAllowList,
}

impl DeepSeekClient<HttpClient> {
    /// Create a client with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Create a client from `DEEPSEEK_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a client from explicit settings
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpClient::new(&config)?;
        Ok(Self::with_transport(transport, config.allowed_models))
    }
}

impl<T: Transport> DeepSeekClient<T> {
    /// Create a client on top of any transport
    pub fn with_transport(transport: T, allowed_models: ModelAllowList) -> Self {
        Self {
            transport,
            allowed_models,
        }
    }

    pub fn allowed_models(&self) -> &ModelAllowList {
        &self.allowed_models
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a request builder for `model`
    pub fn request(&self, model: impl Into<String>) -> ChatRequestBuilder {
        ChatRequestBuilder::new(model)
    }

    /// Send a single-shot chat request and decode the whole response
    pub async fn chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> ServiceResult<ChatResponse> {
        if let Err(e) = self.allowed_models.validate(&request.model) {
            return e.into();
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DeepSeekError::Cancelled),
            outcome = self.send_and_read(request, cancel) => outcome,
        };

        match outcome {
            Ok((status, body)) => api::decode_whole(&body, status),
            Err(e) => {
                debug!(error = %e, "chat request failed");
                e.into()
            }
        }
    }

    async fn send_and_read(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<(u16, Vec<u8>)> {
        let response = self.send(request).await?;
        let body = api::read_body(response.body, cancel).await?;
        Ok((response.status, body))
    }

    async fn send(&self, request: &ChatRequest) -> Result<TransportResponse> {
        let body = serde_json::to_string(request)?;
        debug!(model = %request.model, stream = request.stream, messages = request.messages.len(), "sending chat request");
        self.transport.post_json(CHAT_COMPLETIONS_PATH, body).await
    }

    /// Send a streaming chat request.
    ///
    /// Fails immediately with [`DeepSeekError::StreamNotRequested`] unless
    /// `request.stream` is set. Nothing is sent until the returned stream is
    /// first polled; every later fault arrives as a `Failure` item.
    pub fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<ChatStream<'_>> {
        if !request.stream {
            return Err(DeepSeekError::StreamNotRequested);
        }

        Ok(Box::pin(async_stream::stream! {
            if let Err(e) = self.allowed_models.validate(&request.model) {
                yield ServiceResult::<ChatResponse>::from(e);
                return;
            }

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("stream cancelled before response");
                    return;
                }
                sent = self.send(&request) => sent,
            };

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    debug!(error = %e, "stream request failed");
                    yield ServiceResult::<ChatResponse>::from(e);
                    return;
                }
            };

            let mut chunks = api::decode_stream(response.body, response.status, cancel);
            while let Some(chunk) = chunks.next().await {
                yield chunk;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::codes;
    use crate::client::ByteStream;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Transport that replays a canned response and records requests
    #[derive(Default)]
    struct StubTransport {
        status: u16,
        chunks: Vec<&'static str>,
        calls: AtomicUsize,
        bodies: Mutex<Vec<String>>,
        fail_with_timeout: bool,
    }

    impl StubTransport {
        fn new(status: u16, chunks: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                status,
                chunks,
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn post_json(&self, path: &str, body: String) -> Result<TransportResponse> {
            assert_eq!(path, CHAT_COMPLETIONS_PATH);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(body);

            if self.fail_with_timeout {
                return Err(DeepSeekError::Timeout("operation timed out".to_string()));
            }

            let chunks: Vec<Result<Bytes>> = self
                .chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect();
            let body: ByteStream = Box::pin(stream::iter(chunks));
            Ok(TransportResponse::new(self.status, body))
        }
    }

    fn client(transport: &Arc<StubTransport>) -> DeepSeekClient<Arc<StubTransport>> {
        DeepSeekClient::with_transport(transport.clone(), ModelAllowList::default())
    }

    fn request(model: &str, stream: bool) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: vec![Message::user("Hello")],
            temperature: 0.7,
            max_tokens: 4096,
            stream,
            response_format: None,
            stream_options: None,
        }
    }

    const WHOLE_BODY: &str = r#"{"id":"r1","object":"chat.completion","created":1705651092,"model":"deepseek-chat","choices":[{"index":0,"message":{"role":"assistant","content":"Hi there"},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#;

    #[tokio::test]
    async fn test_chat_success() {
        let transport = StubTransport::new(200, vec![WHOLE_BODY]);
        let result = client(&transport)
            .chat(&request("deepseek-chat", false), &CancellationToken::new())
            .await;

        assert!(result.is_success());
        assert_eq!(result.data().unwrap().content(), Some("Hi there"));
        assert_eq!(transport.calls(), 1);

        let sent: serde_json::Value =
            serde_json::from_str(&transport.bodies.lock().unwrap()[0]).unwrap();
        assert_eq!(sent["model"], "deepseek-chat");
        assert_eq!(sent["max_tokens"], 4096);
        assert_eq!(sent["stream"], false);
    }

    #[tokio::test]
    async fn test_invalid_model_never_reaches_transport() {
        let transport = StubTransport::new(200, vec![WHOLE_BODY]);
        let client = client(&transport);

        let result = client
            .chat(&request("gpt-4o", false), &CancellationToken::new())
            .await;
        assert_eq!(result.status(), 400);
        assert_eq!(result.error().unwrap().message, "Invalid model: gpt-4o");

        let items: Vec<_> = client
            .chat_stream(request("gpt-4o", true), CancellationToken::new())
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].error().unwrap().code, codes::VALIDATION_ERROR);

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_upstream_error() {
        let transport = StubTransport::new(401, vec![r#"{"message":"unauthorized"}"#]);
        let result = client(&transport)
            .chat(&request("deepseek-chat", false), &CancellationToken::new())
            .await;

        assert_eq!(result.status(), 401);
        assert_eq!(result.error().unwrap().message, "unauthorized");
    }

    #[tokio::test]
    async fn test_chat_transport_fault_becomes_failure() {
        let transport = Arc::new(StubTransport {
            fail_with_timeout: true,
            ..StubTransport::default()
        });
        let result = client(&transport)
            .chat(&request("deepseek-chat", false), &CancellationToken::new())
            .await;

        assert_eq!(result.status(), 500);
        assert_eq!(result.error().unwrap().code, codes::TIMEOUT_ERROR);
    }

    #[tokio::test]
    async fn test_chat_cancelled_before_send() {
        let transport = StubTransport::new(200, vec![WHOLE_BODY]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client(&transport)
            .chat(&request("deepseek-chat", false), &cancel)
            .await;

        assert_eq!(result.error().unwrap().code, codes::REQUEST_CANCELLED);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_stream_cancelled_before_send_is_empty() {
        let transport = StubTransport::new(200, vec!["data: [DONE]\n"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let items: Vec<_> = client(&transport)
            .chat_stream(request("deepseek-chat", true), cancel)
            .unwrap()
            .collect()
            .await;

        assert!(items.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_stream_requires_stream_flag() {
        let transport = StubTransport::new(200, vec![]);
        let err = client(&transport)
            .chat_stream(request("deepseek-chat", false), CancellationToken::new())
            .err()
            .unwrap();

        assert!(matches!(err, DeepSeekError::StreamNotRequested));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_stream_is_lazy_and_accumulates() {
        let transport = StubTransport::new(
            200,
            vec![
                "data: {\"id\":\"s1\",\"created\":1,\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
                "data: {\"id\":\"s1\",\"created\":1,\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
                "data: [DONE]\n\n",
            ],
        );
        let client = client(&transport);

        let mut chunks = client
            .chat_stream(request("deepseek-chat", true), CancellationToken::new())
            .unwrap();
        assert_eq!(transport.calls(), 0);

        let mut acc = StreamAccumulator::new();
        while let Some(chunk) = chunks.next().await {
            assert!(chunk.is_success());
            acc.process_result(&chunk);
        }

        assert_eq!(transport.calls(), 1);
        let message = acc.into_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Hello");
    }

    #[tokio::test]
    async fn test_chat_stream_upstream_error() {
        let transport = StubTransport::new(429, vec![r#"{"error":{"message":"Rate limit reached","type":"rate_limit_error"}}"#]);
        let items: Vec<_> = client(&transport)
            .chat_stream(request("deepseek-chat", true), CancellationToken::new())
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status(), 429);
        assert_eq!(items[0].error().unwrap().error_type, "rate_limit_error");
    }

    #[tokio::test]
    async fn test_concurrent_streams_are_independent() {
        let transport = StubTransport::new(
            200,
            vec!["data: {\"id\":\"s\",\"created\":1,\"choices\":[{\"index\":0,\"delta\":{\"content\":\"x\"}}]}\n", "data: [DONE]\n"],
        );
        let client = client(&transport);

        let first = client
            .chat_stream(request("deepseek-chat", true), CancellationToken::new())
            .unwrap()
            .collect::<Vec<_>>();
        let second = client
            .chat_stream(request("deepseek-coder", true), CancellationToken::new())
            .unwrap()
            .collect::<Vec<_>>();
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(transport.calls(), 2);
    }
}
