//! Line Splitting
//!
//! Turns a response byte stream into text lines. Network chunks may end
//! anywhere, including inside a line or a multi-byte UTF-8 sequence, so
//! bytes are buffered until a full line is available.

use crate::error::{DeepSeekError, Result};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use memchr::memchr;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Longest line accepted before the stream fails
pub const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

pin_project! {
    /// Stream of lines read from a byte stream.
    ///
    /// Lines are yielded without their `\n` or `\r\n` terminator. A trailing
    /// line without a terminator is yielded once the inner stream ends. After
    /// an inner error the error is yielded and the stream is finished.
    pub struct LineStream<S> {
        #[pin]
        inner: S,
        buffer: BytesMut,
        // Prefix of `buffer` already known to hold no `\n`
        scanned: usize,
        max_line_bytes: usize,
        finished: bool,
    }
}

impl<S> LineStream<S> {
    pub fn new(inner: S) -> Self {
        Self::with_max_line_bytes(inner, MAX_LINE_BYTES)
    }

    /// Like [`LineStream::new`] with a custom line length limit
    pub fn with_max_line_bytes(inner: S, max_line_bytes: usize) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
            scanned: 0,
            max_line_bytes,
            finished: false,
        }
    }
}

impl<S> Stream for LineStream<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(offset) = memchr(b'\n', &this.buffer[*this.scanned..]) {
                let pos = *this.scanned + offset;
                let line = this.buffer.split_to(pos + 1);
                *this.scanned = 0;
                return Poll::Ready(Some(Ok(decode_line(&line[..pos]))));
            }
            *this.scanned = this.buffer.len();

            if this.buffer.len() > *this.max_line_bytes {
                *this.finished = true;
                this.buffer.clear();
                *this.scanned = 0;
                return Poll::Ready(Some(Err(DeepSeekError::Stream(format!(
                    "line exceeds {} bytes",
                    this.max_line_bytes
                )))));
            }

            if *this.finished {
                if this.buffer.is_empty() {
                    return Poll::Ready(None);
                }
                let line = this.buffer.split();
                *this.scanned = 0;
                return Poll::Ready(Some(Ok(decode_line(&line))));
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => this.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    *this.finished = true;
                    this.buffer.clear();
                    *this.scanned = 0;
                    return Poll::Ready(Some(Err(e)));
                }
                None => *this.finished = true,
            }
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::{stream, StreamExt};
    use tokio_test::{assert_pending, assert_ready};

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(*p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_splits_lines_across_chunks() {
        let lines: Vec<String> = LineStream::new(chunks(&[b"data: he", b"llo\n\nda", b"ta: [DONE]\n"]))
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["data: hello", "", "data: [DONE]"]);
    }

    #[tokio::test]
    async fn test_crlf_and_trailing_line() {
        let lines: Vec<String> = LineStream::new(chunks(&[b"a\r\nb\r", b"\nlast"]))
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["a", "b", "last"]);
    }

    #[tokio::test]
    async fn test_multibyte_char_split_between_chunks() {
        // "é" is 0xC3 0xA9
        let lines: Vec<String> = LineStream::new(chunks(&[b"caf\xC3", b"\xA9\n"]))
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["café"]);
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let inner = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(DeepSeekError::Stream("connection reset".to_string())),
            Ok(Bytes::from_static(b"never\n")),
        ]);
        let items: Vec<Result<String>> = LineStream::new(inner).collect().await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(DeepSeekError::Stream(_))));
    }

    #[test]
    fn test_waits_for_line_terminator() {
        let (tx, rx) = mpsc::unbounded::<Result<Bytes>>();
        let mut lines = tokio_test::task::spawn(LineStream::new(rx));

        tx.unbounded_send(Ok(Bytes::from_static(b"data: {\"id\""))).unwrap();
        assert_pending!(lines.poll_next());

        tx.unbounded_send(Ok(Bytes::from_static(b":\"x\"}\n"))).unwrap();
        assert!(lines.is_woken());
        let line = assert_ready!(lines.poll_next()).unwrap().unwrap();
        assert_eq!(line, "data: {\"id\":\"x\"}");

        drop(tx);
        assert!(assert_ready!(lines.poll_next()).is_none());
    }

    #[tokio::test]
    async fn test_long_line_in_small_chunks() {
        let mut payload = vec![b'x'; 1024 * 1024];
        payload.push(b'\n');
        payload.extend_from_slice(b"tail\n");
        let parts: Vec<Result<Bytes>> = payload
            .chunks(64)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let lines: Vec<String> = LineStream::new(stream::iter(parts))
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 1024 * 1024);
        assert_eq!(lines[1], "tail");
    }

    #[tokio::test]
    async fn test_many_lines_in_one_chunk() {
        let body = "data: 1\n".repeat(10_000);
        let inner = stream::iter(vec![Ok(Bytes::from(body))]);
        let lines: Vec<String> = LineStream::new(inner).map(|l| l.unwrap()).collect().await;

        assert_eq!(lines.len(), 10_000);
        assert!(lines.iter().all(|l| l == "data: 1"));
    }

    #[tokio::test]
    async fn test_overlong_line_is_an_error() {
        let inner = chunks(&[b"short\n", b"0123456789", b"abcdef"]);
        let items: Vec<Result<String>> = LineStream::with_max_line_bytes(inner, 12)
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "short");
        assert!(matches!(items[1], Err(DeepSeekError::Stream(ref m)) if m.contains("12 bytes")));
    }
}
