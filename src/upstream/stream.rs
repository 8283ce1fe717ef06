//! Streaming response forwarding with byte accounting.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use futures_util::Stream;

use crate::observability::metrics;
use crate::upstream::client::UpstreamError;

/// Wraps the upstream body stream, counting forwarded bytes and
/// emitting one observability event per stream outcome: completed,
/// failed mid-flight, or abandoned by the client. Abandonment is
/// detected in Drop, which axum runs when the client disconnects and
/// the response body is discarded.
pub struct MeteredStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    bytes_forwarded: u64,
    started: Instant,
    finished: bool,
}

impl MeteredStream {
    pub(crate) fn new(
        inner: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(inner),
            bytes_forwarded: 0,
            started: Instant::now(),
            finished: false,
        }
    }
}

impl Stream for MeteredStream {
    type Item = Result<Bytes, UpstreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.as_mut().get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes_forwarded += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.finished = true;
                tracing::error!(
                    error = %error,
                    bytes = this.bytes_forwarded,
                    "generation stream failed mid-flight"
                );
                metrics::record_stream(this.bytes_forwarded, this.started.elapsed(), false);
                Poll::Ready(Some(Err(UpstreamError::Stream(error))))
            }
            Poll::Ready(None) => {
                this.finished = true;
                tracing::info!(
                    bytes = this.bytes_forwarded,
                    elapsed_ms = this.started.elapsed().as_millis() as u64,
                    "generation stream completed"
                );
                metrics::record_stream(this.bytes_forwarded, this.started.elapsed(), true);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for MeteredStream {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                bytes = self.bytes_forwarded,
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "generation stream abandoned before completion"
            );
            metrics::record_stream(self.bytes_forwarded, self.started.elapsed(), false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_counts_forwarded_bytes() {
        let chunks = vec![
            Ok::<_, reqwest::Error>(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ];
        let mut stream = MeteredStream::new(futures_util::stream::iter(chunks));

        let mut total = 0;
        while let Some(chunk) = stream.next().await {
            total += chunk.unwrap().len();
        }

        assert_eq!(total, 11);
        assert_eq!(stream.bytes_forwarded, 11);
        assert!(stream.finished);
    }

    #[tokio::test]
    async fn test_empty_stream_completes() {
        let mut stream =
            MeteredStream::new(futures_util::stream::iter(Vec::<Result<Bytes, reqwest::Error>>::new()));

        assert!(stream.next().await.is_none());
        assert_eq!(stream.bytes_forwarded, 0);
        assert!(stream.finished);
    }
}
