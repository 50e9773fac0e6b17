//! Transport Abstraction
//!
//! The seam between request/response handling and the HTTP stack. The
//! response body is exposed as a byte stream so the streaming decoder can
//! start before the whole body has arrived.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// Response body as a stream of byte chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Status line and unread body of an HTTP response
pub struct TransportResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl TransportResponse {
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// `true` for 2xx statuses
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Sends a JSON body and hands back the response without buffering it
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` (already serialized JSON) to `path`, relative to the base URL
    async fn post_json(&self, path: &str, body: String) -> Result<TransportResponse>;
}

#[async_trait]
impl<T> Transport for std::sync::Arc<T>
where
    T: Transport + ?Sized,
{
    async fn post_json(&self, path: &str, body: String) -> Result<TransportResponse> {
        (**self).post_json(path, body).await
    }
}
