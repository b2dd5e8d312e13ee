//! Forward-only skipping for readers without a seek primitive.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, ReadBuf};

/// Size of the scratch buffer that discarded bytes pass through.
const SCRATCH_LEN: usize = 8 * 1024;

pin_project! {
    /// Discards the first `remaining` bytes of `inner` on the first reads.
    ///
    /// Nothing is consumed until the reader is polled, so opening a window
    /// deep into an object costs no I/O up front. Fails with
    /// `UnexpectedEof` if `inner` ends before the prefix is gone.
    pub struct SkipReader<R> {
        #[pin]
        inner: R,
        remaining: u64,
    }
}

impl<R> SkipReader<R> {
    pub fn new(inner: R, skip: u64) -> Self {
        Self {
            inner,
            remaining: skip,
        }
    }

    /// Bytes still to be discarded.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<R: AsyncRead> AsyncRead for SkipReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut this = self.project();

        while *this.remaining > 0 {
            let mut scratch = [0u8; SCRATCH_LEN];
            let want = usize::try_from(*this.remaining)
                .unwrap_or(SCRATCH_LEN)
                .min(SCRATCH_LEN);
            let mut discard = ReadBuf::new(&mut scratch[..want]);

            ready!(this.inner.as_mut().poll_read(cx, &mut discard))?;
            let read = discard.filled().len();
            if read == 0 {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("object ended with {} bytes left to skip", this.remaining),
                )));
            }
            *this.remaining -= read as u64;
        }

        this.inner.poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn nothing_is_read_until_polled() -> io::Result<()> {
        let data = b"0123456789";
        let mut reader = SkipReader::new(&data[..], 4);
        assert_eq!(reader.remaining(), 4);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await?;
        assert_eq!(rest, b"456789");
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn skips_past_the_scratch_buffer() -> io::Result<()> {
        let data: Vec<u8> = (0..3 * SCRATCH_LEN + 10).map(|i| (i % 251) as u8).collect();
        let skip = 2 * SCRATCH_LEN + 7;
        let mut reader = SkipReader::new(data.as_slice(), skip as u64);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await?;
        assert_eq!(rest, &data[skip..]);
        Ok(())
    }

    #[tokio::test]
    async fn short_object_is_an_error() {
        let mut reader = SkipReader::new(&b"abc"[..], 10);

        let mut rest = Vec::new();
        let error = reader.read_to_end(&mut rest).await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }
}
