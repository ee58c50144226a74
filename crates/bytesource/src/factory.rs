// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    BufferView, ByteArrayView, ByteSource, ChunkQueue, ChunkQueueView, Notifier, PullSource, Result, SourceReader,
    StreamingView,
};

/// A byte source shared between several owners on one thread.
///
/// Created by the `shared_from_*` constructors of [`AnySource`] or by
/// [`AnySource::into_shared()`].
pub type SharedSource<'a> = Rc<RefCell<AnySource<'a>>>;

/// Any of the byte sources of this crate, picked to match the kind of input.
///
/// The constructors choose the view that avoids copying wherever possible:
///
/// | Input | Variant |
/// |---|---|
/// | [`PullSource`] backed by an in-memory buffer (e.g. [`Cursor`][std::io::Cursor]) | [`Buffer`][Self::Buffer] |
/// | Any other [`PullSource`] | [`Stream`][Self::Stream] |
/// | [`ChunkQueue`] | [`Chunks`][Self::Chunks] |
/// | Byte slice | [`Array`][Self::Array] |
///
/// # Example
///
/// ```
/// use std::io::Cursor;
///
/// use bytesource::{AnySource, ByteSource};
///
/// let mut buffer = Cursor::new(b"in memory".to_vec());
/// let mut source = AnySource::from_stream(&mut buffer);
///
/// // A cursor is read in place rather than pulled through a scratch buffer.
/// assert!(matches!(source, AnySource::Buffer(_)));
/// assert_eq!(source.read_pointer(None), Some(&b"in memory"[..]));
/// ```
#[derive(Debug)]
pub enum AnySource<'a> {
    /// Reads a byte slice.
    Array(ByteArrayView<'a>),

    /// Reads the storage of a buffer-backed pull source in place.
    Buffer(BufferView<'a>),

    /// Reads a chunk queue.
    Chunks(ChunkQueueView<Box<dyn ChunkQueue + 'a>>),

    /// Pulls from a stream through a scratch buffer.
    Stream(StreamingView<Box<dyn PullSource + 'a>>),
}

impl<'a> AnySource<'a> {
    /// Creates a source that reads `stream` from its current position.
    ///
    /// If the stream exposes an in-memory buffer, the buffer is read in place. Otherwise, data is
    /// pulled from the stream on demand.
    #[must_use]
    pub fn from_stream<S: PullSource + 'a>(stream: &'a mut S) -> Self {
        if stream.as_growable_buffer().is_none() {
            let stream: Box<dyn PullSource + 'a> = Box::new(stream);
            return Self::Stream(StreamingView::new(stream));
        }

        let stream: &'a S = stream;
        let buffer = stream
            .as_growable_buffer()
            .expect("logic error - stream stopped exposing the buffer it exposed a moment ago");

        Self::Buffer(BufferView::new(buffer))
    }

    /// Creates a source that reads `queue` from its start.
    #[must_use]
    pub fn from_chunks<Q: ChunkQueue + 'a>(queue: Q) -> Self {
        let queue: Box<dyn ChunkQueue + 'a> = Box::new(queue);
        Self::Chunks(ChunkQueueView::new(queue))
    }

    /// Creates a source that reads `bytes` from the start.
    #[must_use]
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::Array(ByteArrayView::new(bytes))
    }

    /// Same as [`from_stream()`][Self::from_stream], for shared ownership.
    #[must_use]
    pub fn shared_from_stream<S: PullSource + 'a>(stream: &'a mut S) -> SharedSource<'a> {
        Self::from_stream(stream).into_shared()
    }

    /// Same as [`from_chunks()`][Self::from_chunks], for shared ownership.
    #[must_use]
    pub fn shared_from_chunks<Q: ChunkQueue + 'a>(queue: Q) -> SharedSource<'a> {
        Self::from_chunks(queue).into_shared()
    }

    /// Same as [`from_bytes()`][Self::from_bytes], for shared ownership.
    #[must_use]
    pub fn shared_from_bytes(bytes: &'a [u8]) -> SharedSource<'a> {
        Self::from_bytes(bytes).into_shared()
    }

    /// Moves the source into shared ownership.
    #[must_use]
    pub fn into_shared(self) -> SharedSource<'a> {
        Rc::new(RefCell::new(self))
    }

    /// Wraps the source into a [`std::io::Read`] implementation.
    #[must_use]
    pub fn into_reader(self) -> SourceReader<Self> {
        SourceReader::new(self)
    }
}

macro_rules! dispatch {
    ($self:ident, $source:ident => $body:expr) => {
        match $self {
            Self::Array($source) => $body,
            Self::Buffer($source) => $body,
            Self::Chunks($source) => $body,
            Self::Stream($source) => $body,
        }
    };
}

impl ByteSource for AnySource<'_> {
    fn size(&self) -> Option<u64> {
        dispatch!(self, source => source.size())
    }

    fn position(&self) -> Option<u64> {
        dispatch!(self, source => source.position())
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        dispatch!(self, source => source.read_pointer(max_len))
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        dispatch!(self, source => source.advance(amount))
    }

    fn at_end(&self) -> bool {
        dispatch!(self, source => source.at_end())
    }

    fn reset(&mut self) -> Result<()> {
        dispatch!(self, source => source.reset())
    }

    fn notifier(&self) -> &Notifier {
        dispatch!(self, source => source.notifier())
    }
}
