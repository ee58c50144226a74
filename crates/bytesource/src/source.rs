// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Notifier, Result};

/// A sequential source of bytes that exposes its contents as borrowed windows.
///
/// Instead of copying bytes into a caller-supplied buffer, a byte source hands out a slice
/// referencing memory it already has access to. The caller processes the bytes in place and
/// then marks them as consumed by calling [`advance()`][Self::advance].
///
/// # Read position
///
/// The read position only moves forward, except when [`reset()`][Self::reset] returns it to
/// where it was when the source was created. [`size()`][Self::size] and
/// [`position()`][Self::position] are either both known or both unknown: sources that cannot
/// know their length in advance (sockets, pipes) report neither.
///
/// # Window lifetime
///
/// The window returned by [`read_pointer()`][Self::read_pointer] borrows the source mutably.
/// It stays valid until the next call to `advance()` or `read_pointer()`, and the borrow
/// checker enforces that it is not used afterwards.
///
/// # Example
///
/// ```
/// use bytesource::{ByteArrayView, ByteSource};
///
/// let data = b"Hello, world";
/// let mut source = ByteArrayView::new(data);
/// let mut collected = Vec::new();
///
/// while let Some(window) = source.read_pointer(Some(5)) {
///     let len = window.len();
///     collected.extend_from_slice(window);
///     source.advance(len).unwrap();
/// }
///
/// assert_eq!(collected, data);
/// assert!(source.at_end());
/// ```
pub trait ByteSource {
    /// Total number of bytes this source produces from its initial position, or `None` if the
    /// source cannot know this in advance.
    fn size(&self) -> Option<u64>;

    /// Current read position, or `None` if the source cannot report it.
    fn position(&self) -> Option<u64>;

    /// Returns a window of bytes starting at the current read position.
    ///
    /// If `max_len` is `Some`, the window is at most that long. The window may be shorter than
    /// requested even if more data follows, for example when it would otherwise cross a chunk
    /// boundary, so callers must be prepared to read repeatedly.
    ///
    /// Returns `None` once the end of the data has been reached or the source failed, after which
    /// [`at_end()`][Self::at_end] returns `true`.
    ///
    /// A sequential source may return an empty window if no data is available yet. Wait for a
    /// "data available" notification before trying again.
    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]>;

    /// Marks `amount` bytes as consumed, moving the read position forward.
    ///
    /// `amount` is normally no longer than the last window returned by
    /// [`read_pointer()`][Self::read_pointer]. Sources backed by a pull-only stream also accept
    /// a larger amount, skipping the bytes that were never exposed.
    ///
    /// Subscribers of the source's [`Notifier`] receive a progress report.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`SkipInterrupted`][crate::ErrorKind::SkipInterrupted] if the
    /// underlying stream ended while bytes were being skipped.
    fn advance(&mut self, amount: usize) -> Result<()>;

    /// Whether the source can never produce more bytes.
    fn at_end(&self) -> bool;

    /// Returns the read position to where it was when the source was created.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ResetUnsupported`][crate::ErrorKind::ResetUnsupported] if the
    /// underlying stream cannot seek back. The source is left unchanged in that case.
    fn reset(&mut self) -> Result<()>;

    /// The notifier through which the source reports progress and data availability.
    fn notifier(&self) -> &Notifier;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn size(&self) -> Option<u64> {
        (**self).size()
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        (**self).read_pointer(max_len)
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        (**self).advance(amount)
    }

    fn at_end(&self) -> bool {
        (**self).at_end()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn notifier(&self) -> &Notifier {
        (**self).notifier()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn size(&self) -> Option<u64> {
        (**self).size()
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        (**self).read_pointer(max_len)
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        (**self).advance(amount)
    }

    fn at_end(&self) -> bool {
        (**self).at_end()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn notifier(&self) -> &Notifier {
        (**self).notifier()
    }
}
