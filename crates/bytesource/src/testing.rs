// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Utilities for testing code that consumes byte sources.

use std::io;
use std::num::NonZero;

use crate::{Notifier, PullSource};

/// A [`PullSource`] that pulls from an in-memory byte vector.
///
/// The fake can pose as a seekable file or as a sequential stream whose data is appended over
/// time, and it can be configured to misbehave in ways that real sources do: returning less data
/// than requested, refusing to seek and failing partway through.
///
/// This is for test and example purposes only and is not optimized for performance.
#[derive(Debug)]
pub struct FakePullSource {
    contents: Vec<u8>,
    position: usize,
    sequential: bool,
    closed: bool,
    seekable: bool,

    // For testing purposes, we may choose to limit the pull size and
    // thereby force the caller to do multiple pull operations.
    max_pull_size: Option<NonZero<usize>>,

    // Position at which pulling fails with an error.
    fail_after: Option<usize>,

    pull_count: usize,
    notifier: Option<Notifier>,
}

impl FakePullSource {
    /// Starts building a new `FakePullSource`.
    #[must_use]
    pub fn builder() -> FakePullSourceBuilder {
        FakePullSourceBuilder {
            contents: Vec::new(),
            position: 0,
            sequential: false,
            closed: true,
            seekable: true,
            max_pull_size: None,
            fail_after: None,
        }
    }

    /// Creates a seekable `FakePullSource` with the given contents and the default configuration.
    #[must_use]
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self::builder().contents(contents).build()
    }

    /// Appends data to the end of the contents and notifies the subscriber that data is available.
    pub fn append(&mut self, data: impl AsRef<[u8]>) {
        self.contents.extend_from_slice(data.as_ref());
        self.notify_data_available();
    }

    /// Marks the input as closed and notifies the subscriber, so that it comes back to observe
    /// the end.
    ///
    /// A closed sequential source fails with [`io::ErrorKind::UnexpectedEof`] once drained.
    pub fn close(&mut self) {
        self.closed = true;
        self.notify_data_available();
    }

    /// Number of times [`pull()`][PullSource::pull] has been called.
    #[must_use]
    pub fn pull_count(&self) -> usize {
        self.pull_count
    }

    fn notify_data_available(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.notify_data_available();
        }
    }
}

impl PullSource for FakePullSource {
    #[cfg_attr(test, mutants::skip)] // Mutations easily lead to infinite loops, not worth the effort.
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.pull_count += 1;

        if self.fail_after.is_some_and(|fail_after| self.position >= fail_after) {
            return Err(io::Error::other("injected failure"));
        }

        let remaining = self.contents.len().saturating_sub(self.position);

        if remaining == 0 && self.sequential && self.closed && !buf.is_empty() {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        let len = buf
            .len()
            .min(remaining)
            .min(self.max_pull_size.map_or(usize::MAX, NonZero::get))
            .min(self.fail_after.map_or(usize::MAX, |fail_after| fail_after - self.position));

        if len == 0 {
            return Ok(0);
        }

        buf[..len].copy_from_slice(&self.contents[self.position..self.position + len]);
        self.position += len;

        Ok(len)
    }

    fn is_sequential(&self) -> bool {
        self.sequential
    }

    fn at_end(&self) -> bool {
        self.position >= self.contents.len() && (self.closed || !self.sequential)
    }

    fn position(&self) -> u64 {
        self.position as u64
    }

    fn total_len(&self) -> u64 {
        if self.sequential { 0 } else { self.contents.len() as u64 }
    }

    fn seek_to(&mut self, position: u64) -> io::Result<()> {
        if self.sequential || !self.seekable {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "fake source is not seekable"));
        }

        self.position = usize::try_from(position).map_err(io::Error::other)?;
        Ok(())
    }

    fn subscribe(&mut self, notifier: Notifier) {
        self.notifier = Some(notifier);
    }
}

/// Creates an instance of [`FakePullSource`].
///
/// Access through [`FakePullSource::builder()`][FakePullSource::builder].
#[derive(Debug)]
#[must_use]
pub struct FakePullSourceBuilder {
    contents: Vec<u8>,
    position: usize,
    sequential: bool,
    closed: bool,
    seekable: bool,
    max_pull_size: Option<NonZero<usize>>,
    fail_after: Option<usize>,
}

impl FakePullSourceBuilder {
    /// The data to pull. Defaults to no data.
    pub fn contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = contents.into();
        self
    }

    /// Poses as a sequential stream without a known length. Defaults to `false`.
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Whether the input of a sequential source is already closed, which means no more data
    /// is going to be appended. Defaults to `true`.
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Whether a non-sequential source accepts seeks. Defaults to `true`.
    pub fn seekable(mut self, seekable: bool) -> Self {
        self.seekable = seekable;
        self
    }

    /// The position the source starts at. Defaults to 0.
    pub fn start_at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Sets the maximum number of bytes a single pull returns.
    pub fn max_pull_size(mut self, max_pull_size: NonZero<usize>) -> Self {
        self.max_pull_size = Some(max_pull_size);
        self
    }

    /// Makes pulling fail with an error once the position reaches `position`.
    pub fn fail_after(mut self, position: usize) -> Self {
        self.fail_after = Some(position);
        self
    }

    /// Builds the `FakePullSource` with the provided configuration.
    #[must_use]
    pub fn build(self) -> FakePullSource {
        FakePullSource {
            contents: self.contents,
            position: self.position,
            sequential: self.sequential,
            closed: self.closed,
            seekable: self.seekable,
            max_pull_size: self.max_pull_size,
            fail_after: self.fail_after,
            pull_count: 0,
            notifier: None,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn pulls_contents_in_order() {
        let mut source = FakePullSource::new(b"0123456789".to_vec());
        let mut buf = [0; 4];

        assert_eq!(source.pull(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(source.pull(&mut buf).unwrap(), 4);
        assert_eq!(source.pull(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");

        assert!(source.at_end());
        assert_eq!(source.pull(&mut buf).unwrap(), 0);
        assert_eq!(source.pull_count(), 4);
    }

    #[test]
    fn max_pull_size_limits_each_pull() {
        let mut source = FakePullSource::builder()
            .contents(vec![1; 10])
            .max_pull_size(NonZero::new(3).unwrap())
            .build();
        let mut buf = [0; 10];

        assert_eq!(source.pull(&mut buf).unwrap(), 3);
        assert_eq!(source.position(), 3);
    }

    #[test]
    fn fails_at_configured_position() {
        let mut source = FakePullSource::builder().contents(vec![1; 10]).fail_after(6).build();
        let mut buf = [0; 10];

        assert_eq!(source.pull(&mut buf).unwrap(), 6);
        assert_eq!(source.pull(&mut buf).unwrap_err().kind(), io::ErrorKind::Other);
    }

    #[test]
    fn seeks_unless_configured_otherwise() {
        let mut source = FakePullSource::builder().contents(vec![1; 10]).start_at(4).build();
        assert_eq!(source.position(), 4);
        assert_eq!(source.total_len(), 10);

        source.rewind().unwrap();
        assert_eq!(source.position(), 0);

        let mut fixed = FakePullSource::builder().contents(vec![1; 10]).seekable(false).build();
        assert_eq!(fixed.seek_to(2).unwrap_err().kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn open_sequential_source_waits_for_data() {
        let mut source = FakePullSource::builder().sequential(true).closed(false).build();
        let notifications = Arc::new(AtomicUsize::new(0));

        let notifier = Notifier::new();
        let notifications_clone = Arc::clone(&notifications);
        notifier.on_data_available(move || {
            notifications_clone.fetch_add(1, Ordering::Relaxed);
        });
        source.subscribe(notifier);

        let mut buf = [0; 8];
        assert_eq!(source.pull(&mut buf).unwrap(), 0);
        assert!(!source.at_end());
        assert_eq!(source.total_len(), 0);

        source.append(b"abc");
        assert_eq!(source.pull(&mut buf).unwrap(), 3);

        source.close();
        assert!(source.at_end());
        assert_eq!(source.pull(&mut buf).unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(notifications.load(Ordering::Relaxed), 2);
    }
}
