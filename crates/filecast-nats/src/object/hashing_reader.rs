//! Byte counting and SHA-256 over a stream in flight.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, ReadBuf};

pin_project! {
    /// Passes reads through unchanged while hashing and counting them.
    ///
    /// Upload bodies flow through this on their way into a store, so the
    /// size and checksum are known the moment the store stops reading.
    pub struct HashingReader<R> {
        #[pin]
        inner: R,
        digest: Sha256,
        len: u64,
    }
}

impl<R> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            digest: Sha256::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn bytes_read(&self) -> u64 {
        self.len
    }

    /// Lowercase hex SHA-256 of everything read.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.digest.finalize())
    }
}

impl<R: AsyncRead> AsyncRead for HashingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let start = buf.filled().len();

        ready!(this.inner.poll_read(cx, buf))?;

        let chunk = &buf.filled()[start..];
        this.digest.update(chunk);
        *this.len += chunk.len() as u64;
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn untouched_reader_hashes_nothing() {
        let reader = HashingReader::new(tokio::io::empty());
        assert_eq!(reader.bytes_read(), 0);
        assert_eq!(reader.finalize_hex(), EMPTY_SHA256);
    }

    #[tokio::test]
    async fn small_reads_add_up() -> io::Result<()> {
        let data = b"Hello, World!";
        let mut reader = HashingReader::new(&data[..]);

        let mut copied = Vec::new();
        let mut chunk = [0u8; 4];
        loop {
            match reader.read(&mut chunk).await? {
                0 => break,
                n => copied.extend_from_slice(&chunk[..n]),
            }
        }

        assert_eq!(copied, data);
        assert_eq!(reader.bytes_read(), 13);
        assert_eq!(
            reader.finalize_hex(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        Ok(())
    }
}
