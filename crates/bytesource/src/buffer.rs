// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Cursor;

use crate::{ByteArrayView, ByteSource, Notifier, Result};

/// The storage of a growable in-memory buffer that is read from a position.
///
/// This is implemented for [`Cursor<T>`], which is the standard library's buffer with a read
/// position. Buffers are read in place by [`BufferView`].
pub trait GrowableBuffer {
    /// All bytes held by the buffer, including the ones before the read position.
    fn contents(&self) -> &[u8];

    /// The offset in [`contents()`][Self::contents] from which the buffer is read.
    fn read_position(&self) -> u64;
}

impl<T: AsRef<[u8]>> GrowableBuffer for Cursor<T> {
    fn contents(&self) -> &[u8] {
        self.get_ref().as_ref()
    }

    fn read_position(&self) -> u64 {
        self.position()
    }
}

/// A [`ByteSource`] over the unread part of a [`GrowableBuffer`].
///
/// The range from the buffer's read position to the end of its contents is captured once, when
/// the view is created, and read without copying. The buffer is borrowed for the lifetime of the
/// view, so it cannot grow or move while being read.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
///
/// use bytesource::{BufferView, ByteSource};
///
/// let mut buffer = Cursor::new(b"header:payload".to_vec());
/// buffer.set_position(7);
///
/// let mut source = BufferView::new(&buffer);
///
/// assert_eq!(source.size(), Some(7));
/// assert_eq!(source.read_pointer(None), Some(&b"payload"[..]));
/// ```
#[derive(Debug)]
pub struct BufferView<'a> {
    inner: ByteArrayView<'a>,
}

impl<'a> BufferView<'a> {
    /// Creates a view over the bytes of `buffer` from its read position onwards.
    ///
    /// A read position beyond the end of the contents results in an empty view.
    #[must_use]
    pub fn new<B: GrowableBuffer + ?Sized>(buffer: &'a B) -> Self {
        let contents = buffer.contents();
        let start = usize::try_from(buffer.read_position()).map_or(contents.len(), |position| position.min(contents.len()));

        Self {
            inner: ByteArrayView::new(&contents[start..]),
        }
    }
}

impl ByteSource for BufferView<'_> {
    fn size(&self) -> Option<u64> {
        self.inner.size()
    }

    fn position(&self) -> Option<u64> {
        self.inner.position()
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        self.inner.read_pointer(max_len)
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        self.inner.advance(amount)
    }

    fn at_end(&self) -> bool {
        self.inner.at_end()
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }

    fn notifier(&self) -> &Notifier {
        self.inner.notifier()
    }
}
