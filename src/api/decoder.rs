//! Response Decoder
//!
//! Turns raw response bodies into [`ServiceResult`] values. Nothing in here
//! returns an error: every fault becomes a `Failure` variant.

use crate::api::completion::ChatResponse;
use crate::api::lines::LineStream;
use crate::api::result::{ErrorInfo, ServiceResult};
use crate::api::streaming::{parse_sse_line, ChatStream, SseLine};
use crate::client::transport::{is_success_status, ByteStream};
use crate::error::{DeepSeekError, Result};
use async_stream::stream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Decode a fully buffered response body
pub fn decode_whole(body: &[u8], status: u16) -> ServiceResult<ChatResponse> {
    if !is_success_status(status) {
        return decode_error(body, status);
    }

    match serde_json::from_slice::<ChatResponse>(body) {
        Ok(response) => ServiceResult::success(response, status),
        Err(e) => {
            warn!(status, error = %e, "failed to parse chat completion body");
            DeepSeekError::from(e).into()
        }
    }
}

/// Decode the body of a non-2xx response
pub fn decode_error<T>(body: &[u8], status: u16) -> ServiceResult<T> {
    let error = ErrorInfo::from_body(body).unwrap_or_else(ErrorInfo::unknown);
    warn!(status, code = %error.code, message = %error.message, "upstream returned an error");
    ServiceResult::failure(error, status)
}

/// Read a body stream to the end, giving up when `cancel` fires
pub async fn read_body(mut body: ByteStream, cancel: &CancellationToken) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DeepSeekError::Cancelled),
            next = body.next() => next,
        };

        match next {
            Some(chunk) => buffer.extend_from_slice(&chunk?),
            None => return Ok(buffer),
        }
    }
}

/// Decode a streamed response line by line.
///
/// On a non-2xx `status` the body is read whole and a single failure is
/// emitted. Otherwise every `data: ` line becomes one item, a malformed line
/// becomes a `JSON_PARSE_ERROR` failure without ending the stream, and
/// `data: [DONE]` ends it. Cancelling `cancel` ends the stream without
/// emitting anything further. The body is dropped as soon as the stream ends
/// or is dropped.
pub fn decode_stream(body: ByteStream, status: u16, cancel: CancellationToken) -> ChatStream<'static> {
    Box::pin(stream! {
        if !is_success_status(status) {
            match read_body(body, &cancel).await {
                Ok(bytes) => yield decode_error::<ChatResponse>(&bytes, status),
                Err(DeepSeekError::Cancelled) => debug!("stream cancelled while reading error body"),
                Err(e) => yield ServiceResult::<ChatResponse>::from(e),
            }
            return;
        }

        let mut lines = LineStream::new(body);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("stream cancelled by caller");
                    break;
                }
                next = lines.next() => next,
            };

            let line = match next {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    warn!(error = %e, "stream read failed");
                    yield ServiceResult::failure(e.to_error_info(), e.status());
                    break;
                }
                None => {
                    debug!("stream ended without [DONE]");
                    break;
                }
            };

            match parse_sse_line(&line) {
                SseLine::Skip => continue,
                SseLine::Done => {
                    debug!("stream finished");
                    break;
                }
                SseLine::Chunk(Ok(chunk)) => yield ServiceResult::success(chunk, status),
                SseLine::Chunk(Err(e)) => {
                    warn!(error = %e, "skipping malformed stream chunk");
                    yield ServiceResult::failure(ErrorInfo::json_parse(&e), status);
                }
            }
        }

        drop(lines);
    })
}
