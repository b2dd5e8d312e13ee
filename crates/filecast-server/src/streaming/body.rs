use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio_util::io::ReaderStream;

use super::TRACING_TARGET;
use crate::service::store::ObjectReader;

/// Read buffer size for response bodies.
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Streaming,
    Completed,
    Failed,
}

/// Response body over an object reader.
///
/// Logs how each streaming session ends. A session that is dropped while
/// still streaming was abandoned by the client.
pub struct ObjectBodyStream {
    inner: ReaderStream<ObjectReader<'static>>,
    name: String,
    expected: u64,
    sent: u64,
    session: Session,
}

impl ObjectBodyStream {
    /// Wraps `reader`, which must yield exactly `expected` bytes.
    pub fn new(reader: ObjectReader<'static>, name: impl Into<String>, expected: u64) -> Self {
        Self {
            inner: ReaderStream::with_capacity(reader, CHUNK_SIZE),
            name: name.into(),
            expected,
            sent: 0,
            session: Session::Streaming,
        }
    }

    fn fail(&mut self, error: io::Error) -> io::Error {
        self.session = Session::Failed;
        tracing::error!(
            target: TRACING_TARGET,
            name = %self.name,
            sent = self.sent,
            expected = self.expected,
            error = %error,
            "Store read failed while streaming"
        );
        error
    }
}

impl Stream for ObjectBodyStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.session != Session::Streaming {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => Poll::Ready(Some(Err(this.fail(error)))),
            Poll::Ready(None) if this.sent < this.expected => {
                let error = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "object ended before the announced length",
                );
                Poll::Ready(Some(Err(this.fail(error))))
            }
            Poll::Ready(None) => {
                this.session = Session::Completed;
                tracing::debug!(
                    target: TRACING_TARGET,
                    name = %this.name,
                    sent = this.sent,
                    "Stream completed"
                );
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ObjectBodyStream {
    fn drop(&mut self) {
        if self.session == Session::Streaming {
            tracing::debug!(
                target: TRACING_TARGET,
                name = %self.name,
                sent = self.sent,
                expected = self.expected,
                "Stream aborted by client"
            );
        }
    }
}
