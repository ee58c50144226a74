// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::num::NonZero;

use crate::{ByteSource, Error, ErrorKind, Notifier, Progress, PullSource, Result};

/// Capacity of the scratch buffer of a [`StreamingView`] unless configured otherwise.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 16 * 1024;

/// A [`ByteSource`] over a [`PullSource`] such as a file or a socket.
///
/// Pull sources cannot expose their storage, so the view pulls their data into a scratch buffer
/// that it owns and exposes windows into that buffer. The buffer is allocated on the first read
/// and released by [`reset()`][ByteSource::reset]. Windows are served from the buffer until the
/// caller has advanced over all of it; only then is more data pulled from the source.
///
/// The caller may advance beyond the last window it was given. The view then skips the excess
/// bytes by pulling and discarding them, which fails if the source ends first.
///
/// For sequential sources the size and position are unknown. When such a source ends, the view
/// reports a final progress of the total number of bytes consumed, with that same number as the
/// total.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use std::num::NonZero;
///
/// use bytesource::{ByteSource, SeekableReader, StreamingView};
///
/// let file = SeekableReader::new(Cursor::new(vec![7_u8; 10_000])).unwrap();
///
/// let mut source = StreamingView::builder(file)
///     .scratch_capacity(NonZero::new(4096).unwrap())
///     .build();
///
/// let mut total = 0;
///
/// while let Some(window) = source.read_pointer(None) {
///     assert!(window.len() <= 4096);
///     let len = window.len();
///     total += len;
///     source.advance(len).unwrap();
/// }
///
/// assert_eq!(total, 10_000);
/// assert!(source.at_end());
/// ```
pub struct StreamingView<S> {
    source: S,
    capacity: usize,

    // Allocated on the first read, dropped on reset.
    scratch: Option<Box<[u8]>>,

    // Number of bytes of `scratch` that hold data pulled from the source.
    filled: usize,

    // Offset in `scratch` of the next unread byte. Exceeds `filled` only after a failed skip.
    cursor: usize,

    total_advanced: u64,
    eof: bool,
    initial_position: u64,
    notifier: Notifier,
}

impl<S: PullSource> StreamingView<S> {
    /// Creates a view with the default configuration that pulls from `source`, starting at its
    /// current position.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::builder(source).build()
    }

    /// Starts building a view that pulls from `source`.
    #[must_use]
    pub fn builder(source: S) -> StreamingViewBuilder<S> {
        StreamingViewBuilder {
            source,
            capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }

    /// The source this view pulls from.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the source this view pulls from.
    ///
    /// Any data already pulled into the scratch buffer but not yet consumed is lost.
    #[must_use]
    pub fn into_source(self) -> S {
        self.source
    }

    /// Number of bytes the caller has advanced over since creation or the last reset.
    #[must_use]
    pub fn total_advanced(&self) -> u64 {
        self.total_advanced
    }

    /// Capacity of the scratch buffer, which bounds the length of every window.
    #[must_use]
    pub fn scratch_capacity(&self) -> usize {
        self.capacity
    }

    /// Pulls and discards `count` bytes that the caller advanced over without reading them.
    ///
    /// The bytes are pulled into the scratch buffer in batches. Skipping stops at the first pull
    /// that yields no data.
    #[cfg_attr(test, mutants::skip)] // Mutating the loop condition leads to infinite loops.
    fn skip(&mut self, count: usize, size: Option<u64>) -> Result<()> {
        let scratch = allocate_scratch(&mut self.scratch, self.capacity);

        let mut remaining = count;

        while remaining > 0 {
            let batch = remaining.min(scratch.len());

            let cause = match self.source.pull(&mut scratch[..batch]) {
                Ok(0) => None,
                Ok(pulled) => {
                    remaining = remaining.saturating_sub(pulled);
                    continue;
                }
                Err(error) => Some(error),
            };

            // Report how far the source actually got before it ran dry.
            let reached = self.total_advanced.saturating_sub(remaining as u64);
            self.notifier.notify_progress(Progress::new(reached, size));

            tracing::debug!(remaining, reached, "pull source ended while skipping unread bytes");

            return Err(match cause {
                Some(error) => Error::caused_by(ErrorKind::SkipInterrupted, error),
                None => Error::new(ErrorKind::SkipInterrupted),
            });
        }

        Ok(())
    }
}

// Borrows only the scratch field, leaving the other fields of the view accessible while the
// returned buffer is borrowed.
fn allocate_scratch(scratch: &mut Option<Box<[u8]>>, capacity: usize) -> &mut [u8] {
    scratch.get_or_insert_with(|| {
        tracing::trace!(capacity, "allocating scratch buffer");
        vec![0; capacity].into_boxed_slice()
    })
}

impl<S: PullSource> ByteSource for StreamingView<S> {
    fn size(&self) -> Option<u64> {
        if self.source.is_sequential() {
            return None;
        }

        Some(self.source.total_len().saturating_sub(self.initial_position))
    }

    fn position(&self) -> Option<u64> {
        if self.source.is_sequential() {
            return None;
        }

        Some(self.source.position())
    }

    fn read_pointer(&mut self, max_len: Option<usize>) -> Option<&[u8]> {
        if self.eof {
            return None;
        }

        let capacity = self.capacity;
        let scratch = allocate_scratch(&mut self.scratch, capacity);

        if self.filled > self.cursor {
            let unread = self.filled - self.cursor;
            let len = max_len.map_or(unread, |max_len| max_len.min(unread));
            return Some(&scratch[self.cursor..self.cursor + len]);
        }

        let request = max_len.map_or(capacity, |max_len| max_len.min(capacity));

        match self.source.pull(&mut scratch[..request]) {
            Ok(pulled) if pulled > 0 || self.source.is_sequential() || !self.source.at_end() => {
                self.filled = pulled;
                self.cursor = 0;
                return Some(&scratch[..pulled]);
            }
            Ok(_) => {
                tracing::debug!(total_advanced = self.total_advanced, "pull source reached its end");
            }
            Err(error) => {
                tracing::debug!(%error, total_advanced = self.total_advanced, "pull source failed or was closed");
            }
        }

        self.eof = true;

        // Observers that never knew the total learn it now.
        if self.source.is_sequential() {
            self.notifier
                .notify_progress(Progress::new(self.total_advanced, Some(self.total_advanced)));
        }

        None
    }

    fn advance(&mut self, amount: usize) -> Result<()> {
        self.total_advanced = self.total_advanced.saturating_add(amount as u64);
        self.cursor = self.cursor.saturating_add(amount);

        let size = self.size();
        self.notifier
            .notify_progress(Progress::new(self.total_advanced, Some(size.unwrap_or(self.total_advanced))));

        if self.cursor > self.filled {
            let excess = self.cursor - self.filled;
            self.skip(excess, size)?;

            self.cursor = 0;
            self.filled = 0;
        }

        Ok(())
    }

    fn at_end(&self) -> bool {
        self.eof
    }

    fn reset(&mut self) -> Result<()> {
        let rewound = if self.initial_position == 0 {
            self.source.rewind()
        } else {
            self.source.seek_to(self.initial_position)
        };

        if let Err(error) = rewound {
            tracing::debug!(%error, initial_position = self.initial_position, "pull source cannot be reset");
            return Err(Error::caused_by(ErrorKind::ResetUnsupported, error));
        }

        self.eof = false;
        self.total_advanced = 0;
        self.scratch = None;
        self.filled = 0;
        self.cursor = 0;

        Ok(())
    }

    fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}

impl<S: fmt::Debug> fmt::Debug for StreamingView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingView")
            .field("source", &self.source)
            .field("capacity", &self.capacity)
            .field("scratch_allocated", &self.scratch.is_some())
            .field("filled", &self.filled)
            .field("cursor", &self.cursor)
            .field("total_advanced", &self.total_advanced)
            .field("eof", &self.eof)
            .field("initial_position", &self.initial_position)
            .field("notifier", &self.notifier)
            .finish()
    }
}

/// Configures and creates a [`StreamingView`].
///
/// Create an instance via [`StreamingView::builder()`].
#[derive(Debug)]
#[must_use]
pub struct StreamingViewBuilder<S> {
    source: S,
    capacity: usize,
}

impl<S: PullSource> StreamingViewBuilder<S> {
    /// Sets the capacity of the scratch buffer, which bounds the length of every window.
    ///
    /// Defaults to [`DEFAULT_SCRATCH_CAPACITY`].
    pub fn scratch_capacity(mut self, capacity: NonZero<usize>) -> Self {
        self.capacity = capacity.get();
        self
    }

    /// Creates the view, recording the current position of the source as the position that
    /// [`reset()`][ByteSource::reset] returns to.
    ///
    /// The view subscribes to "data available" notifications of the source.
    #[must_use]
    pub fn build(self) -> StreamingView<S> {
        let Self { mut source, capacity } = self;

        let notifier = Notifier::new();
        source.subscribe(notifier.clone());

        StreamingView {
            initial_position: source.position(),
            source,
            capacity,
            scratch: None,
            filled: 0,
            cursor: 0,
            total_advanced: 0,
            eof: false,
            notifier,
        }
    }
}
