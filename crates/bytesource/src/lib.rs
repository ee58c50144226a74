// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Zero-copy sequential reads over heterogeneous byte sources.
//!
//! A [`ByteSource`] exposes its contents as borrowed slices into memory that already exists,
//! instead of copying bytes into a caller-supplied buffer. Reading is a two-step process:
//!
//! 1. [`read_pointer()`][ByteSource::read_pointer] returns a window of bytes starting at the
//!    current read position. The window may be shorter than requested and the source decides
//!    how long it is (e.g. a chunk boundary may cut it short).
//! 2. [`advance()`][ByteSource::advance] marks bytes as consumed, moving the read position
//!    forward. The next call to `read_pointer()` exposes the bytes that follow.
//!
//! ```
//! use bytesource::{ByteSource, ChunkBuffer, ChunkQueueView};
//!
//! let mut queue = ChunkBuffer::new();
//! queue.append(&b"Hello, "[..]);
//! queue.append(&b"world"[..]);
//!
//! let mut source = ChunkQueueView::new(queue);
//! let mut window_lengths = Vec::new();
//!
//! while let Some(window) = source.read_pointer(None) {
//!     let len = window.len();
//!     window_lengths.push(len);
//!     source.advance(len).unwrap();
//! }
//!
//! // Each window ends at a chunk boundary.
//! assert_eq!(window_lengths, [7, 5]);
//! ```
//!
//! # Kinds of sources
//!
//! * [`ByteArrayView`] reads from a byte slice.
//! * [`BufferView`] reads from a growable buffer with a read position, such as
//!   [`Cursor<Vec<u8>>`][std::io::Cursor], starting at that position.
//! * [`ChunkQueueView`] reads from a [`ChunkQueue`] such as [`ChunkBuffer`], which may be shared
//!   with a producer that keeps appending to it.
//! * [`StreamingView`] reads from a [`PullSource`] such as a file or a socket. These sources have
//!   no storage that can be referenced directly, so this is the only view that copies data,
//!   pulling it into an internal scratch buffer on demand.
//!
//! [`AnySource`] picks the right view for a given input. [`SourceReader`] turns any byte source
//! back into a [`std::io::Read`] for consumers that cannot use the window-based interface.
//!
//! # Notifications
//!
//! Every source owns a [`Notifier`]. Subscribers are told about read progress whenever the source
//! advances and about new data becoming available in sequential pull sources, which lets a
//! consumer that observed an empty window know when to try again.
//!
//! The `test-util` feature enables a fake pull source for testing code that consumes byte
//! sources. It is in the `testing` module.

mod array;
mod buffer;
mod chunk_queue;
mod chunk_view;
mod error;
mod factory;
mod notify;
mod pull;
mod reader;
mod source;
mod streaming;

pub use array::ByteArrayView;
pub use buffer::{BufferView, GrowableBuffer};
pub use chunk_queue::{ChunkBuffer, ChunkQueue};
pub use chunk_view::ChunkQueueView;
pub use error::{Error, ErrorKind, Result};
pub use factory::{AnySource, SharedSource};
pub use notify::{Notifier, Progress};
pub use pull::{PullSource, SeekableReader, SequentialReader};
pub use reader::SourceReader;
pub use source::ByteSource;
pub use streaming::{DEFAULT_SCRATCH_CAPACITY, StreamingView, StreamingViewBuilder};

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
