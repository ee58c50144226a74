// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// The operation of a byte source that failed.
///
/// Reaching the end of the data is not an error. It is signaled by
/// [`read_pointer()`][crate::ByteSource::read_pointer] returning `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The underlying source could not return to the position it had when the view was created.
    ///
    /// The view is left unchanged and cannot be read again from the start.
    ResetUnsupported,

    /// The underlying source ran out of data while skipping over bytes that the caller advanced
    /// past without ever reading them.
    SkipInterrupted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetUnsupported => f.write_str("the underlying source cannot seek back to its initial position"),
            Self::SkipInterrupted => f.write_str("the underlying source ended while skipping unread bytes"),
        }
    }
}

/// An error signaled by a byte source.
///
/// Use [`kind()`][Self::kind] to find out which operation failed. If the failure originated in
/// the underlying source, the original I/O error is available as the cause.
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// The operation that failed.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A `Result` that may contain an [`Error`] from this crate.
pub type Result<T> = std::result::Result<T, Error>;
