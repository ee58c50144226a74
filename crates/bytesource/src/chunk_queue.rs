// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::rc::Rc;
use std::sync::Arc;

use bytes::{Buf, Bytes};
use parking_lot::Mutex;

/// A queue of byte chunks that can be read at any offset.
///
/// The bytes of the queue form one logical sequence, but a read at a given offset only reaches
/// up to the end of the chunk that contains the offset.
///
/// The trait is forwarded through shared handles (`Arc<Q>`, `Rc<Q>`, `&Q`) and through
/// `parking_lot::Mutex<Q>` and `RefCell<Q>`, so a queue can be read by a [`ChunkQueueView`]
/// while another owner of the handle keeps appending to it.
///
/// [`ChunkQueueView`]: crate::ChunkQueueView
pub trait ChunkQueue: Debug {
    /// Total number of bytes held by the queue.
    fn len(&self) -> usize;

    /// Whether the queue holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes from `offset` up to the end of the chunk that contains `offset`.
    ///
    /// Returns an empty sequence if `offset` is at or beyond the end of the queue.
    fn chunk_at(&self, offset: usize) -> Bytes;
}

/// A queue of byte chunks, appended at the back and consumed from the front.
///
/// Chunks are stored as [`Bytes`], so exposing them through [`ChunkQueue::chunk_at()`] does not
/// copy any data.
///
/// # Example
///
/// ```
/// use bytesource::{ChunkBuffer, ChunkQueue};
///
/// let mut queue = ChunkBuffer::new();
/// queue.append(&b"abc"[..]);
/// queue.append(b"defg".to_vec());
///
/// assert_eq!(queue.len(), 7);
/// assert_eq!(queue.chunk_at(1), &b"bc"[..]);
/// assert_eq!(queue.chunk_at(3), &b"defg"[..]);
///
/// queue.consume(4);
/// assert_eq!(queue.chunk_at(0), &b"efg"[..]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChunkBuffer {
    chunks: VecDeque<Bytes>,
    len: usize,
}

impl ChunkBuffer {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the back of the queue.
    ///
    /// Empty chunks are ignored.
    pub fn append(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();

        if chunk.is_empty() {
            return;
        }

        self.len = self.len.checked_add(chunk.len()).expect("queue length overflows usize");
        self.chunks.push_back(chunk);
    }

    /// Removes `count` bytes from the front of the queue.
    ///
    /// # Panics
    ///
    /// Panics if `count` is greater than the number of bytes in the queue.
    #[cfg_attr(test, mutants::skip)] // Mutating this can cause infinite loops.
    pub fn consume(&mut self, mut count: usize) {
        self.len = self
            .len
            .checked_sub(count)
            .expect("attempted to consume more bytes than the queue holds");

        while count > 0 {
            let front = self
                .chunks
                .front_mut()
                .expect("logic error - ran out of chunks before consuming their contents");

            if count < front.len() {
                front.advance(count);
                break;
            }

            count -= front.len();
            self.chunks.pop_front();
        }
    }

    /// Number of chunks in the queue.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Removes all chunks from the queue.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }
}

impl ChunkQueue for ChunkBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        let mut chunk_start = 0;

        for chunk in &self.chunks {
            let chunk_end = chunk_start + chunk.len();

            if offset < chunk_end {
                return chunk.slice(offset - chunk_start..);
            }

            chunk_start = chunk_end;
        }

        Bytes::new()
    }
}

impl<Q: ChunkQueue + ?Sized> ChunkQueue for &Q {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        (**self).chunk_at(offset)
    }
}

impl<Q: ChunkQueue + ?Sized> ChunkQueue for Box<Q> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        (**self).chunk_at(offset)
    }
}

impl<Q: ChunkQueue + ?Sized> ChunkQueue for Rc<Q> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        (**self).chunk_at(offset)
    }
}

impl<Q: ChunkQueue + ?Sized> ChunkQueue for Arc<Q> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        (**self).chunk_at(offset)
    }
}

impl<Q: ChunkQueue + ?Sized> ChunkQueue for RefCell<Q> {
    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        self.borrow().chunk_at(offset)
    }
}

impl<Q: ChunkQueue + ?Sized> ChunkQueue for Mutex<Q> {
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn chunk_at(&self, offset: usize) -> Bytes {
        self.lock().chunk_at(offset)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    fn three_chunks() -> ChunkBuffer {
        let mut queue = ChunkBuffer::new();
        queue.append(&b"aaaaaaaaaa"[..]);
        queue.append(&b"bbbbbbbbbb"[..]);
        queue.append(&b"cccccccccc"[..]);
        queue
    }

    #[test]
    fn chunk_at_stops_at_chunk_boundary() {
        let queue = three_chunks();

        assert_eq!(queue.len(), 30);
        assert_eq!(queue.chunk_count(), 3);
        assert_eq!(queue.chunk_at(0), &b"aaaaaaaaaa"[..]);
        assert_eq!(queue.chunk_at(7), &b"aaa"[..]);
        assert_eq!(queue.chunk_at(10), &b"bbbbbbbbbb"[..]);
        assert_eq!(queue.chunk_at(29), &b"c"[..]);
    }

    #[test]
    fn chunk_at_past_end_is_empty() {
        let queue = three_chunks();
        assert!(queue.chunk_at(30).is_empty());
        assert!(queue.chunk_at(1000).is_empty());
        assert!(ChunkBuffer::new().chunk_at(0).is_empty());
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut queue = ChunkBuffer::new();
        queue.append(Vec::new());
        queue.append(&b"x"[..]);

        assert_eq!(queue.chunk_count(), 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn consume_across_chunks() {
        let mut queue = three_chunks();

        queue.consume(15);
        assert_eq!(queue.len(), 15);
        assert_eq!(queue.chunk_count(), 2);
        assert_eq!(queue.chunk_at(0), &b"bbbbb"[..]);

        queue.consume(5);
        assert_eq!(queue.chunk_count(), 1);
        assert_eq!(queue.chunk_at(0), &b"cccccccccc"[..]);

        queue.consume(10);
        assert!(queue.is_empty());
        assert_eq!(queue.chunk_count(), 0);
    }

    #[test]
    #[should_panic]
    fn consume_too_much_panics() {
        let mut queue = three_chunks();
        queue.consume(31);
    }

    #[test]
    fn clear_empties_queue() {
        let mut queue = three_chunks();
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.chunk_at(0).is_empty());
    }

    #[test]
    fn shared_handles_see_appends() {
        let shared = Arc::new(Mutex::new(ChunkBuffer::new()));
        let reader: &dyn ChunkQueue = &shared;

        assert!(reader.is_empty());

        shared.lock().append(&b"late"[..]);

        assert_eq!(reader.len(), 4);
        assert_eq!(reader.chunk_at(1), &b"ate"[..]);
    }

    #[test]
    fn ref_cell_forwards() {
        let queue = Rc::new(RefCell::new(three_chunks()));
        assert_eq!(ChunkQueue::len(&queue), 30);

        queue.borrow_mut().consume(10);
        assert_eq!(queue.chunk_at(0), &b"bbbbbbbbbb"[..]);
    }
}
