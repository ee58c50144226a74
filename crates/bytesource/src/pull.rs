// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::{GrowableBuffer, Notifier};

/// A stream that can only be read by pulling bytes into a caller-provided buffer.
///
/// Files, pipes and sockets are pull sources: they have no storage that could be referenced
/// directly, so a [`StreamingView`][crate::StreamingView] copies their data into a scratch
/// buffer before exposing it.
///
/// # Sequential sources
///
/// A source is sequential if it cannot know its length and cannot seek (e.g. a socket). Such
/// a source reports a lack of data with `Ok(0)` and expects to be polled again after it has
/// fired a "data available" notification. Once its input has been closed and drained, a
/// sequential source fails with [`io::ErrorKind::UnexpectedEof`].
///
/// A non-sequential source returns `Ok(0)` only at its end, where [`at_end()`][Self::at_end]
/// is `true`.
pub trait PullSource: Debug {
    /// Reads at most `buf.len()` bytes into `buf`, returning the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns an error if the source failed or, for sequential sources, if the input has been
    /// closed and no data remains.
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Whether the source is unbounded and cannot seek.
    fn is_sequential(&self) -> bool;

    /// Whether no more data can be pulled.
    fn at_end(&self) -> bool;

    /// Current absolute position. Meaningless for sequential sources.
    fn position(&self) -> u64;

    /// Total length of the source. Meaningless for sequential sources.
    fn total_len(&self) -> u64;

    /// Moves the position to the absolute offset `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot seek.
    fn seek_to(&mut self, position: u64) -> io::Result<()>;

    /// Moves the position to the start of the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot seek.
    fn rewind(&mut self) -> io::Result<()> {
        self.seek_to(0)
    }

    /// Hands the source a notifier that it fires whenever more data may have become available,
    /// including when its input has been closed.
    ///
    /// Sources without asynchronous delivery can ignore this, which is the default.
    fn subscribe(&mut self, notifier: Notifier) {
        drop(notifier);
    }

    /// Exposes the storage of a source that is backed by an in-memory buffer.
    ///
    /// [`AnySource::from_stream()`][crate::AnySource::from_stream] reads such sources in place
    /// instead of pulling their data through a scratch buffer.
    fn as_growable_buffer(&self) -> Option<&dyn GrowableBuffer> {
        None
    }
}

impl<T: PullSource + ?Sized> PullSource for &mut T {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).pull(buf)
    }

    fn is_sequential(&self) -> bool {
        (**self).is_sequential()
    }

    fn at_end(&self) -> bool {
        (**self).at_end()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn total_len(&self) -> u64 {
        (**self).total_len()
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        (**self).seek_to(position)
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }

    fn subscribe(&mut self, notifier: Notifier) {
        (**self).subscribe(notifier);
    }

    fn as_growable_buffer(&self) -> Option<&dyn GrowableBuffer> {
        (**self).as_growable_buffer()
    }
}

impl<T: PullSource + ?Sized> PullSource for Box<T> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).pull(buf)
    }

    fn is_sequential(&self) -> bool {
        (**self).is_sequential()
    }

    fn at_end(&self) -> bool {
        (**self).at_end()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn total_len(&self) -> u64 {
        (**self).total_len()
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        (**self).seek_to(position)
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }

    fn subscribe(&mut self, notifier: Notifier) {
        (**self).subscribe(notifier);
    }

    fn as_growable_buffer(&self) -> Option<&dyn GrowableBuffer> {
        (**self).as_growable_buffer()
    }
}

/// An in-memory buffer is a pull source that can also be read in place.
impl<T: AsRef<[u8]> + Debug> PullSource for Cursor<T> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn is_sequential(&self) -> bool {
        false
    }

    fn at_end(&self) -> bool {
        self.position() >= self.total_len()
    }

    fn position(&self) -> u64 {
        Self::position(self)
    }

    fn total_len(&self) -> u64 {
        self.get_ref().as_ref().len() as u64
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        self.set_position(position);
        Ok(())
    }

    fn as_growable_buffer(&self) -> Option<&dyn GrowableBuffer> {
        Some(self)
    }
}

/// A [`PullSource`] over a reader that can seek, such as a [`File`][std::fs::File].
///
/// The length of the reader is determined when the source is created. If the reader ends
/// earlier (e.g. the file was truncated), the length shrinks to where it ended.
#[derive(Debug)]
pub struct SeekableReader<R> {
    inner: R,
    position: u64,
    len: u64,
}

impl<R: Read + Seek> SeekableReader<R> {
    /// Creates a source that pulls from `inner`, starting at its current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position or the length of `inner` cannot be determined.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let position = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;

        Ok(Self { inner, position, len })
    }

    /// Returns the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek + Debug> PullSource for SeekableReader<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = loop {
            match self.inner.read(buf) {
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                result => break result?,
            }
        };

        // The reader ended before the length it reported when the source was created.
        if read == 0 && !buf.is_empty() {
            self.len = self.position;
        }

        self.position += read as u64;
        Ok(read)
    }

    fn is_sequential(&self) -> bool {
        false
    }

    fn at_end(&self) -> bool {
        self.position >= self.len
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn total_len(&self) -> u64 {
        self.len
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

/// A [`PullSource`] over a reader that can neither seek nor tell its length in advance, such as
/// a socket or a pipe.
///
/// A non-blocking reader that has no data yet ([`io::ErrorKind::WouldBlock`]) is reported as
/// having pulled zero bytes. Interrupted reads are retried. When the reader reaches its end, the
/// input is considered closed: subscribers are told that data is available (so they come back
/// and observe the end) and every further pull fails with [`io::ErrorKind::UnexpectedEof`].
///
/// Whatever drives the reader (an event loop, a readiness callback) calls
/// [`notify_data_available()`][Self::notify_data_available] when new data arrives.
#[derive(Debug)]
pub struct SequentialReader<R> {
    inner: R,
    pulled: u64,
    closed: bool,
    notifier: Option<Notifier>,
}

impl<R: Read> SequentialReader<R> {
    /// Creates a source that pulls from `inner`.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pulled: 0,
            closed: false,
            notifier: None,
        }
    }

    /// Tells the subscribed byte source that more data may be available.
    pub fn notify_data_available(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.notify_data_available();
        }
    }

    /// Whether the underlying reader has reached its end.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Debug> PullSource for SequentialReader<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        if buf.is_empty() {
            return Ok(0);
        }

        let result = loop {
            match self.inner.read(buf) {
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                result => break result,
            }
        };

        match result {
            Ok(0) => {
                self.closed = true;
                self.notify_data_available();
                Err(io::ErrorKind::UnexpectedEof.into())
            }
            Ok(read) => {
                self.pulled += read as u64;
                Ok(read)
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(error) => Err(error),
        }
    }

    fn is_sequential(&self) -> bool {
        true
    }

    fn at_end(&self) -> bool {
        self.closed
    }

    fn position(&self) -> u64 {
        self.pulled
    }

    fn total_len(&self) -> u64 {
        0
    }

    fn seek_to(&mut self, _position: u64) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "sequential sources cannot seek"))
    }

    fn subscribe(&mut self, notifier: Notifier) {
        self.notifier = Some(notifier);
    }
}
