// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::{self, BufRead, Read, Write};

use crate::{ByteSource, Notifier, Result};

/// Adapter that implements [`Read`] and [`BufRead`] for any [`ByteSource`].
///
/// Create an instance via [`SourceReader::new()`] or [`AnySource::into_reader()`][1].
///
/// [`Read::read()`] copies from the windows of the source into the caller's buffer. Because a
/// byte source already exposes its contents as windows, this adapter implements [`BufRead`]
/// directly without needing an intermediate buffer. Prefer this over wrapping in
/// [`std::io::BufReader`].
///
/// A sequential source that has no data available yet makes [`Read::read()`] fail with
/// [`io::ErrorKind::WouldBlock`]. Subscribe to the source's [`Notifier`] to learn when to try
/// again.
///
/// The adapter is read-only. It implements [`Write`] only so that it can be passed where a
/// bidirectional device is expected, and every write fails.
///
/// [1]: crate::AnySource::into_reader
///
/// # Example
///
/// ```
/// use std::io::BufRead;
///
/// use bytesource::{ChunkBuffer, ChunkQueueView, SourceReader};
///
/// let mut queue = ChunkBuffer::new();
/// queue.append(&b"first li"[..]);
/// queue.append(&b"ne\nsecond line\n"[..]);
///
/// let reader = SourceReader::new(ChunkQueueView::new(queue));
/// let lines: Vec<String> = reader.lines().map(Result::unwrap).collect();
///
/// assert_eq!(lines, ["first line", "second line"]);
/// ```
#[derive(Debug)]
pub struct SourceReader<S> {
    source: S,
}

impl<S: ByteSource> SourceReader<S> {
    /// Wraps `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Whether the source is a stream without a known length.
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        self.source.size().is_none()
    }

    /// Number of bytes the source produces, or 0 for a sequential source.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.source.size().unwrap_or(0)
    }

    /// Whether the source can never produce more bytes.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.source.at_end()
    }

    /// Returns the source to where it was when it was created.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be reset. See [`ByteSource::reset()`].
    pub fn reset(&mut self) -> Result<()> {
        self.source.reset()
    }

    /// The notifier of the source.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        self.source.notifier()
    }

    /// The wrapped source.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// The wrapped source.
    ///
    /// Advancing the source directly moves the read position of this reader too.
    #[must_use]
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Returns the wrapped source.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: ByteSource> Read for SourceReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let Some(window) = self.source.read_pointer(Some(buf.len())) else {
            return Ok(0);
        };

        if window.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        let len = window.len().min(buf.len());
        buf[..len].copy_from_slice(&window[..len]);

        self.source.advance(len).map_err(io::Error::other)?;

        Ok(len)
    }
}

impl<S: ByteSource> BufRead for SourceReader<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.source.read_pointer(None).unwrap_or_default())
    }

    fn consume(&mut self, amount: usize) {
        if let Err(error) = self.source.advance(amount) {
            tracing::warn!(%error, amount, "failed to advance byte source");
        }
    }
}

impl<S: ByteSource> Write for SourceReader<S> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "byte sources are read-only"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::testing::FakePullSource;
    use crate::{ByteArrayView, ChunkBuffer, ChunkQueueView, StreamingView};

    #[test]
    fn smoke_test() {
        let mut reader = SourceReader::new(ByteArrayView::new(b"Hello, world"));

        let mut buffer = [0u8; 5];

        assert_eq!(reader.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer, b"Hello");

        assert_eq!(reader.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer, b", wor");

        assert_eq!(reader.read(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"ld");

        assert_eq!(reader.read(&mut buffer).unwrap(), 0);
        assert!(reader.at_end());
    }

    #[test]
    fn read_stops_at_chunk_boundary() {
        let mut queue = ChunkBuffer::new();
        queue.append(&b"abc"[..]);
        queue.append(&b"defgh"[..]);

        let mut reader = SourceReader::new(ChunkQueueView::new(queue));
        let mut buffer = [0u8; 6];

        assert_eq!(reader.read(&mut buffer).unwrap(), 3);
        assert_eq!(reader.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer[..5], b"defgh");
    }

    #[test]
    fn size_of_known_source() {
        let reader = SourceReader::new(ByteArrayView::new(&[0; 12]));

        assert!(!reader.is_sequential());
        assert_eq!(reader.size(), 12);
    }

    #[test]
    fn sequential_source_has_size_zero_and_would_block() {
        let source = FakePullSource::builder().sequential(true).closed(false).build();
        let mut reader = SourceReader::new(StreamingView::new(source));

        assert!(reader.is_sequential());
        assert_eq!(reader.size(), 0);

        let mut buffer = [0u8; 4];
        assert_eq!(reader.read(&mut buffer).unwrap_err().kind(), io::ErrorKind::WouldBlock);
        assert!(!reader.at_end());
    }

    #[test]
    fn write_is_rejected() {
        let mut reader = SourceReader::new(ByteArrayView::new(b"abc"));

        assert_eq!(reader.write(b"x").unwrap_err().kind(), io::ErrorKind::Unsupported);
        reader.flush().unwrap();
    }

    #[test]
    fn buf_read_exposes_windows() {
        let mut reader = SourceReader::new(ByteArrayView::new(b"Hello, world"));

        assert_eq!(reader.fill_buf().unwrap(), b"Hello, world");
        reader.consume(7);
        assert_eq!(reader.fill_buf().unwrap(), b"world");
        reader.consume(5);
        assert!(reader.fill_buf().unwrap().is_empty());
    }

    #[test]
    #[traced_test]
    fn failed_consume_is_logged() {
        let mut reader = SourceReader::new(StreamingView::new(FakePullSource::new(vec![1; 10])));

        reader.consume(50);

        assert!(logs_contain("failed to advance byte source"));
    }

    #[test]
    fn read_ends_on_pull_failure() {
        let source = FakePullSource::builder().contents(vec![1; 10]).fail_after(4).build();
        let mut reader = SourceReader::new(StreamingView::new(source));
        let mut buffer = [0u8; 8];

        assert_eq!(reader.read(&mut buffer).unwrap(), 4);

        // The stream fails on the next pull, which ends it.
        assert_eq!(reader.read(&mut buffer).unwrap(), 0);
        assert!(reader.at_end());
    }

    #[test]
    fn reset_and_accessors_delegate() {
        let mut reader = SourceReader::new(ByteArrayView::new(b"abc"));
        let mut buffer = [0u8; 3];

        reader.read_exact(&mut buffer).unwrap();
        assert_eq!(reader.get_ref().position(), Some(3));

        reader.reset().unwrap();
        assert_eq!(reader.get_mut().position(), Some(0));
        reader.notifier().notify_data_available();

        let source = reader.into_inner();
        assert_eq!(source.size(), Some(3));
    }

    #[test]
    fn nested_readers_share_position() {
        let mut source = ByteArrayView::new(b"abcdef");

        {
            let mut reader = SourceReader::new(&mut source);
            let mut buffer = [0u8; 2];
            reader.read_exact(&mut buffer).unwrap();
        }

        let mut rest = String::new();
        SourceReader::new(&mut source).read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "cdef");
    }
}
