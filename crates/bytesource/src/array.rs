// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{ByteSource, Notifier, Progress, Result};

/// A [`ByteSource`] over a byte slice.
///
/// Every window is a direct reference into the slice, so reading never copies. The slice is
/// borrowed for the lifetime of the view.
///
/// # Example
///
/// ```
/// use bytesource::{ByteArrayView, ByteSource};
///
/// let mut source = ByteArrayView::new(b"Hello, world");
///
/// assert_eq!(source.read_pointer(Some(5)), Some(&b"Hello"[..]));
/// source.advance(7).unwrap();
///
/// assert_eq!(source.read_pointer(None), Some(&b"world"[..]));
/// source.advance(5).unwrap();
///
/// assert!(source.at_end());
/// assert_eq!(source.read_pointer(None), None);
/// ```
#[derive(Debug)]
pub struct ByteArrayView<'a> {
    bytes: &'a [u8],
    cursor: usize,
    notifier: Notifier,
}

impl<'a> ByteArrayView<'a> {
    /// Creates a view that reads `bytes` from the start.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            cursor: 0,
            notifier: Notifier::new(),
        }
    }
}

impl ByteSource for ByteArrayView<'_> {
    fn size(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }

    fn position(&self) -> Option<u64> {
        Some(self.cursor as u64)
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        if self.at_end() {
            return None;
        }

        let remaining = &self.bytes[self.cursor..];
        let len = max_len.map_or(remaining.len(), |max_len| max_len.min(remaining.len()));

        Some(&remaining[..len])
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        self.cursor = self.cursor.saturating_add(amount);
        self.notifier
            .notify_progress(Progress::new(self.cursor as u64, Some(self.bytes.len() as u64)));

        Ok(())
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
