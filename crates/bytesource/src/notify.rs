// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Read progress of a byte source, reported whenever its read position advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Number of bytes consumed so far.
    pub current: u64,

    /// Total number of bytes the source produces, if known.
    pub total: Option<u64>,
}

impl Progress {
    /// Creates a progress report.
    #[must_use]
    pub const fn new(current: u64, total: Option<u64>) -> Self {
        Self { current, total }
    }
}

type DataAvailableCallback = Box<dyn FnMut() + Send>;
type ProgressCallback = Box<dyn FnMut(Progress) + Send>;

#[derive(Default)]
struct Subscribers {
    data_available: Vec<DataAvailableCallback>,
    progress: Vec<ProgressCallback>,
}

/// Delivers "data available" and "progress" notifications to the subscribers of a byte source.
///
/// Clones of a `Notifier` share the same subscribers, so a clone handed to an underlying
/// source (see [`PullSource::subscribe()`][crate::PullSource::subscribe]) notifies everyone
/// subscribed through the byte source itself.
///
/// Callbacks are invoked synchronously, on the thread that triggered the notification, while
/// the subscriber list is locked. A callback must not subscribe to or trigger notifications on
/// the notifier that is invoking it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// use bytesource::{ByteArrayView, ByteSource};
///
/// let mut source = ByteArrayView::new(b"Hello, world");
///
/// let consumed = Arc::new(AtomicU64::new(0));
/// let consumed_clone = Arc::clone(&consumed);
/// source.notifier().on_progress(move |progress| consumed_clone.store(progress.current, Ordering::Relaxed));
///
/// source.advance(5).unwrap();
/// assert_eq!(consumed.load(Ordering::Relaxed), 5);
/// ```
#[derive(Clone, Default)]
pub struct Notifier {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl Notifier {
    /// Creates a notifier without any subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked whenever new data may have become available.
    ///
    /// The notification carries no payload. It is delivered opportunistically, so the subscriber
    /// is expected to call [`read_pointer()`][crate::ByteSource::read_pointer] again and find out
    /// what changed, which may also be that the source has ended.
    pub fn on_data_available(&self, callback: impl FnMut() + Send + 'static) {
        self.subscribers.lock().data_available.push(Box::new(callback));
    }

    /// Registers a callback invoked with the read progress whenever the source advances.
    pub fn on_progress(&self, callback: impl FnMut(Progress) + Send + 'static) {
        self.subscribers.lock().progress.push(Box::new(callback));
    }

    /// Tells all subscribers that new data may be available.
    pub fn notify_data_available(&self) {
        let mut subscribers = self.subscribers.lock();

        for callback in &mut subscribers.data_available {
            callback();
        }
    }

    /// Reports read progress to all subscribers.
    pub fn notify_progress(&self, progress: Progress) {
        let mut subscribers = self.subscribers.lock();

        for callback in &mut subscribers.progress {
            callback(progress);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.lock();

        f.debug_struct("Notifier")
            .field("data_available", &subscribers.data_available.len())
            .field("progress", &subscribers.progress.len())
            .finish()
    }
}
