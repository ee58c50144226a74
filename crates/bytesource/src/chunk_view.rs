// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use bytes::Bytes;

use crate::{ByteSource, ChunkQueue, Notifier, Progress, Result};

/// A [`ByteSource`] over a [`ChunkQueue`].
///
/// A window never crosses a chunk boundary, so even an unbounded
/// [`read_pointer()`][ByteSource::read_pointer] may return fewer bytes than remain in the queue.
/// Callers read and advance repeatedly until the source is at its end.
///
/// The view only reads from the queue and never removes chunks from it. Pass a shared handle such
/// as `Arc<parking_lot::Mutex<ChunkBuffer>>` to read from a queue that another owner keeps
/// appending to; the size of the source grows with the queue.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use bytesource::{ByteSource, ChunkBuffer, ChunkQueueView};
/// use parking_lot::Mutex;
///
/// let queue = Arc::new(Mutex::new(ChunkBuffer::new()));
/// let mut source = ChunkQueueView::new(Arc::clone(&queue));
///
/// assert!(source.at_end());
///
/// queue.lock().append(&b"more data"[..]);
///
/// assert!(!source.at_end());
/// assert_eq!(source.read_pointer(Some(4)), Some(&b"more"[..]));
/// ```
#[derive(Debug)]
pub struct ChunkQueueView<Q> {
    queue: Q,
    cursor: usize,

    // Keeps the chunk exposed by the last `read_pointer()` alive while the caller inspects it.
    window: Bytes,

    notifier: Notifier,
}

impl<Q: ChunkQueue> ChunkQueueView<Q> {
    /// Creates a view that reads `queue` from its start.
    #[must_use]
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            cursor: 0,
            window: Bytes::new(),
            notifier: Notifier::new(),
        }
    }

    /// The queue this view reads from.
    #[must_use]
    pub fn queue(&self) -> &Q {
        &self.queue
    }
}

impl<Q: ChunkQueue> ByteSource for ChunkQueueView<Q> {
    fn size(&self) -> Option<u64> {
        Some(self.queue.len() as u64)
    }

    fn position(&self) -> Option<u64> {
        Some(self.cursor as u64)
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        if self.at_end() {
            return None;
        }

        self.window = self.queue.chunk_at(self.cursor);
        let len = max_len.map_or(self.window.len(), |max_len| max_len.min(self.window.len()));

        Some(&self.window[..len])
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        self.cursor = self.cursor.saturating_add(amount);
        self.window.clear();
        self.notifier
            .notify_progress(Progress::new(self.cursor as u64, Some(self.queue.len() as u64)));

        Ok(())
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        self.window.clear();
        Ok(())
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
